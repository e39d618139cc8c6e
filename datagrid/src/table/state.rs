//! Table lifecycle state

/// Where the table is in its update cycle.
///
/// Local tables move `LocalIdle → LocalRecomputing → LocalIdle`; server
/// tables move `RemoteIdle → RemoteLoading → RemoteIdle | RemoteError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    LocalIdle,
    LocalRecomputing,
    RemoteIdle,
    RemoteLoading,
    /// The last fetch failed. The table stays usable and the next change
    /// fetches again.
    RemoteError,
}

impl TableState {
    /// The resting state for a table of the given mode.
    pub fn idle(client_side: bool) -> Self {
        if client_side {
            TableState::LocalIdle
        } else {
            TableState::RemoteIdle
        }
    }

    /// Returns `true` while rows are being fetched.
    pub fn is_loading(self) -> bool {
        self == TableState::RemoteLoading
    }
}
