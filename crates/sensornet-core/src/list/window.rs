// ── Page-number windowing ──

use std::fmt;

use serde::{Serialize, Serializer};

/// Up to this many pages, every page is listed.
const MAX_FULL_PAGES: u32 = 5;

/// One entry of a page selector.
///
/// Serializes as the page number or the string `"..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEntry {
    Page(u32),
    Ellipsis,
}

impl Serialize for PageEntry {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Page(n) => s.serialize_u32(*n),
            Self::Ellipsis => s.serialize_str("..."),
        }
    }
}

impl fmt::Display for PageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(n) => write!(f, "{n}"),
            Self::Ellipsis => f.write_str("..."),
        }
    }
}

/// Page-selector entries for `current` out of `total` pages.
///
/// Five or fewer pages are listed in full. Otherwise the first and last
/// pages are always present, with a three-page window around `current`
/// that stretches to page 4 near the start and starts at `total - 3` near
/// the end. Gaps between the window and the ends become
/// [`PageEntry::Ellipsis`].
pub fn page_numbers(current: u32, total: u32) -> Vec<PageEntry> {
    if total == 0 {
        return Vec::new();
    }
    if total <= MAX_FULL_PAGES {
        return (1..=total).map(PageEntry::Page).collect();
    }

    let current = current.clamp(1, total);
    let (start, end) = if current <= 3 {
        (1, 4)
    } else if current >= total - 2 {
        (total - 3, total)
    } else {
        (current - 1, current + 1)
    };

    let mut entries = Vec::with_capacity(7);
    if start > 1 {
        entries.push(PageEntry::Page(1));
        if start > 2 {
            entries.push(PageEntry::Ellipsis);
        }
    }
    entries.extend((start..=end).map(PageEntry::Page));
    if end < total {
        if end < total - 1 {
            entries.push(PageEntry::Ellipsis);
        }
        entries.push(PageEntry::Page(total));
    }
    entries
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::PageEntry::{Ellipsis, Page};
    use super::*;

    #[test]
    fn small_totals_list_every_page() {
        assert_eq!(page_numbers(2, 4), vec![Page(1), Page(2), Page(3), Page(4)]);
        assert_eq!(page_numbers(1, 1), vec![Page(1)]);
        assert!(page_numbers(1, 0).is_empty());
    }

    #[test]
    fn middle_window_has_both_ellipses() {
        assert_eq!(
            page_numbers(5, 10),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn window_near_start_runs_to_page_four() {
        let expected = vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(10)];
        assert_eq!(page_numbers(1, 10), expected);
        assert_eq!(page_numbers(3, 10), expected);
    }

    #[test]
    fn window_near_end_starts_three_back() {
        let expected = vec![Page(1), Ellipsis, Page(7), Page(8), Page(9), Page(10)];
        assert_eq!(page_numbers(8, 10), expected);
        assert_eq!(page_numbers(10, 10), expected);
    }

    #[test]
    fn six_pages_hide_a_single_page() {
        // total 6, current 4: window 3..6 abuts the last page, page 2 is hidden
        assert_eq!(
            page_numbers(4, 6),
            vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Page(6)]
        );
        // total 6, current 3: window 1..4, one hidden page before the end
        assert_eq!(
            page_numbers(3, 6),
            vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(6)]
        );
    }

    #[test]
    fn out_of_range_current_is_clamped() {
        assert_eq!(page_numbers(0, 10), page_numbers(1, 10));
        assert_eq!(page_numbers(99, 10), page_numbers(10, 10));
    }

    #[test]
    fn entries_render_for_display_and_json() {
        assert_eq!(Ellipsis.to_string(), "...");
        assert_eq!(Page(3).to_string(), "3");
        let json = serde_json::to_string(&page_numbers(5, 10)).unwrap_or_default();
        assert_eq!(json, r#"[1,"...",4,5,6,"...",10]"#);
    }
}
