//! Channel naming.

use std::fmt;

use projectfs_core::types::{ClientId, ProjectId};

/// Typed channel identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    /// Disk changes and recycle bin events for one project.
    Project(ProjectId),
    /// Recycle bin events for every project of one client.
    Client(ClientId),
}

impl ChannelType {
    /// Parses `project:{uuid}` or `client:{uuid}`.
    pub fn parse(channel: &str) -> Option<Self> {
        match channel.split_once(':')? {
            ("project", id) => id.parse().ok().map(Self::Project),
            ("client", id) => id.parse().ok().map(Self::Client),
            _ => None,
        }
    }

    /// The wire name.
    pub fn to_channel_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(id) => write!(f, "project:{id}"),
            Self::Client(id) => write!(f, "client:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_known_prefixes() {
        let project = ProjectId::new();
        let name = ChannelType::Project(project).to_channel_name();
        assert_eq!(ChannelType::parse(&name), Some(ChannelType::Project(project)));
        assert!(ChannelType::parse("folder:abc").is_none());
        assert!(ChannelType::parse("client:not-a-uuid").is_none());
        assert!(ChannelType::parse("project").is_none());
    }
}
