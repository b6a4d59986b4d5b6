//! Which file system events count as a change.

use notify::event::ModifyKind;
use notify::{Event, EventKind};

use backlog_common_fs::is_markdown;

/// A create, write, rename or permission change touching a `.md` file.
/// Removals and reads are ignored.
pub fn is_relevant(event: &Event) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Create(_)
            | EventKind::Modify(
                ModifyKind::Any | ModifyKind::Data(_) | ModifyKind::Metadata(_) | ModifyKind::Name(_)
            )
    );

    kind_matches && event.paths.iter().any(is_markdown)
}
