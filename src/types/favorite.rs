/// Result of a direct set-favorite request.
///
/// `NeedsConfirmation` carries the voter's current favorite so the caller
/// can prompt before invoking the confirmed switch. No write happened in
/// that case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Favorited,
    Unfavorited,
    NeedsConfirmation { current: i64 },
}
