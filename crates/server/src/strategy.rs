//! Strategy labels describing which inputs a mix had available.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label returned with every mix.
///
/// The label reflects the inputs that were available (online history given,
/// personal rows found), not what survived deduplication and history
/// exclusion. A request with history and personal rows is reported as
/// `online_history + personal` even if every similar track was filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[serde(rename = "online_history + personal")]
    OnlineHistoryAndPersonal,
    #[serde(rename = "online_history + top_popular")]
    OnlineHistoryAndTopPopular,
    #[serde(rename = "personal_only")]
    PersonalOnly,
    #[serde(rename = "top_popular_only")]
    TopPopularOnly,
}

impl Strategy {
    /// Decision table, first match wins:
    ///
    /// | history | personal | label |
    /// |---|---|---|
    /// | yes | yes | `online_history + personal` |
    /// | yes | no  | `online_history + top_popular` |
    /// | no  | yes | `personal_only` |
    /// | no  | no  | `top_popular_only` |
    pub fn from_inputs(has_history: bool, has_personal: bool) -> Self {
        match (has_history, has_personal) {
            (true, true) => Strategy::OnlineHistoryAndPersonal,
            (true, false) => Strategy::OnlineHistoryAndTopPopular,
            (false, true) => Strategy::PersonalOnly,
            (false, false) => Strategy::TopPopularOnly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::OnlineHistoryAndPersonal => "online_history + personal",
            Strategy::OnlineHistoryAndTopPopular => "online_history + top_popular",
            Strategy::PersonalOnly => "personal_only",
            Strategy::TopPopularOnly => "top_popular_only",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
