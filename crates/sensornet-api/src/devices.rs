// Device command endpoint
//
// Fire-and-forget actuator commands. The acknowledgement only confirms
// receipt; the device state change arrives later on the push channel.

use std::collections::HashMap;

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::CommandAck;

impl ApiClient {
    /// Submit an actuator command.
    ///
    /// `POST /api/device/` with `{"<device>": "<action>"}`
    pub async fn control_device(&self, device: &str, action: &str) -> Result<CommandAck, Error> {
        debug!(device, action, "submitting device command");
        let body = HashMap::from([(device, action)]);
        self.post(self.api_url("device/")?, &body).await
    }
}
