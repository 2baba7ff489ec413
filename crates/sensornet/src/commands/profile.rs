//! Operator profile handlers.

use std::str::FromStr;

use strum::IntoEnumIterator;

use sensornet_config::{TomlStore, operator_profile_path};
use sensornet_core::{OperatorProfile, ProfileEditor, ProfileField};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::error::CliError;
use crate::output;

fn field_names() -> String {
    ProfileField::iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn detail(p: &OperatorProfile) -> String {
    let value = |v: &str| if v.is_empty() { "-".to_owned() } else { v.to_owned() };
    [
        format!("Name:        {}", value(&p.name)),
        format!("Student ID:  {}", value(&p.student_id)),
        format!("GitHub:      {}", value(&p.github)),
        format!("Report:      {}", value(&p.report_url)),
        format!("API docs:    {}", value(&p.api_docs_url)),
        format!("Avatar:      {}", value(&p.avatar)),
    ]
    .join("\n")
}

pub fn handle(args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut editor = ProfileEditor::mount(TomlStore::new(operator_profile_path()))?;

    if let ProfileCommand::Set { field, value } = args.command {
        let field = ProfileField::from_str(&field).map_err(|_| CliError::Validation {
            field: "field".into(),
            reason: format!("unknown profile field '{field}' (expected one of: {})", field_names()),
        })?;
        editor.set_field(field, value)?;
        output::note(&format!("Updated {field}"), global.quiet);
    }

    let out = output::render_single(global.output, editor.get(), detail)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
