use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProdeError {
    #[error("Format parse error: {0}")]
    FormatParse(#[from] serde_yaml::Error),

    #[error("Invalid tournament format: {0}")]
    InvalidFormat(String),

    #[error("Invalid tournament data: {0}")]
    InvalidData(String),

    #[error("Profile decode error: {0}")]
    ProfileDecode(#[from] serde_json::Error),

    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] validator::ValidationErrors),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown match: {0}")]
    UnknownMatch(String),

    #[error("Team {team_id} is not playing match {match_id}")]
    NotAParticipant { match_id: String, team_id: String },

    #[error("Team {team_id} is not a candidate for playoff path {placeholder_id}")]
    InvalidResolution { placeholder_id: String, team_id: String },
}

impl ProdeError {
    /// Errors a caller can recover from by falling back to a fresh profile.
    pub fn is_profile_error(&self) -> bool {
        matches!(
            self,
            ProdeError::ProfileDecode(_)
                | ProdeError::InvalidProfile(_)
                | ProdeError::InvalidResolution { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProdeError>;
