//! Errors for save/restore (§4.10, §7).

/// Errors that can occur while writing or reading a save file.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The save file could not be written or read from disk.
    #[error("save file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The save file's JSON could not be parsed or serialized.
    #[error("save file format error: {0}")]
    Json(#[from] serde_json::Error),

    /// An agent's saved `current_action` named an action kind that either
    /// does not exist or whose `custom_save_data` didn't match its shape.
    #[error("could not restore action {action_class_name:?} for agent {agent_id}")]
    UnrestorableAction {
        /// The agent the action belonged to.
        agent_id: cultivation_types::AgentId,
        /// The unrecognized or malformed action class name.
        action_class_name: String,
    },
}
