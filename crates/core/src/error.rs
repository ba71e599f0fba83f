#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create conversation directory: {0}")]
    ConversationDirCreation(std::io::Error),
    #[error("failed to write conversation file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read conversation file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to remove conversation directory: {0}")]
    ConversationRemoval(std::io::Error),
    #[error("failed to serialize conversation: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize conversation: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("invalid forbidden pattern '{pattern}': {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("identifier error: {0}")]
    Uuid(#[from] solace_uuid::UuidError),
    #[error("text error: {0}")]
    Text(#[from] solace_types::TextError),
}

pub type ChatResult<T> = std::result::Result<T, ChatError>;
