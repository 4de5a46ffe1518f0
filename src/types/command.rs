//! Table mutation commands carried by depth updates.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Table command named by a feed message.
///
/// Unrecognized names parse to [`TableCommand::Unknown`] so that newer feed
/// revisions never make a message undecodable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableCommand {
    /// `ADD` - insert at a position, shifting deeper rows down
    Add,
    /// `DEL` - remove a position, shifting deeper rows up
    Delete,
    /// `DELALL` - empty the side
    DeleteAll,
    /// `DELBETTER` - remove the position and everything better
    DeleteBetterOrEqual,
    /// `DELSIDE` - empty the side
    DeleteSide,
    /// `EXEC` - trade at a position, removing everything better
    Execute,
    /// `MOD` - update a position in place
    Modify,
    /// `REPLACE` - set a position, extending the side if needed
    Replace,
    /// `REPLACE_BY_BROKER` - requote a broker's order
    ReplaceByBroker,
    /// `CLEARALL` - empty the side
    ClearAll,
    /// `REPLACE_CLEAR` - blank a position without collapsing the side
    ReplaceClear,
    /// Anything else
    Unknown(String),
}

impl TableCommand {
    /// Wire name
    pub fn as_str(&self) -> &str {
        match self {
            TableCommand::Add => "ADD",
            TableCommand::Delete => "DEL",
            TableCommand::DeleteAll => "DELALL",
            TableCommand::DeleteBetterOrEqual => "DELBETTER",
            TableCommand::DeleteSide => "DELSIDE",
            TableCommand::Execute => "EXEC",
            TableCommand::Modify => "MOD",
            TableCommand::Replace => "REPLACE",
            TableCommand::ReplaceByBroker => "REPLACE_BY_BROKER",
            TableCommand::ClearAll => "CLEARALL",
            TableCommand::ReplaceClear => "REPLACE_CLEAR",
            TableCommand::Unknown(name) => name,
        }
    }
}

impl From<&str> for TableCommand {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADD" => TableCommand::Add,
            "DEL" => TableCommand::Delete,
            "DELALL" => TableCommand::DeleteAll,
            "DELBETTER" => TableCommand::DeleteBetterOrEqual,
            "DELSIDE" => TableCommand::DeleteSide,
            "EXEC" => TableCommand::Execute,
            "MOD" => TableCommand::Modify,
            "REPLACE" => TableCommand::Replace,
            "REPLACE_BY_BROKER" => TableCommand::ReplaceByBroker,
            "CLEARALL" => TableCommand::ClearAll,
            "REPLACE_CLEAR" => TableCommand::ReplaceClear,
            _ => TableCommand::Unknown(s.to_string()),
        }
    }
}

impl fmt::Display for TableCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TableCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TableCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(TableCommand::from(name.as_str()))
    }
}
