use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynError {
    #[error("raw packet injection not permitted on {0} (need root/CAP_NET_RAW)")]
    NotPermitted(String),

    #[error("interface {0} not found")]
    InterfaceNotFound(String),

    #[error("failed to open injection handle on {interface}: {source}")]
    ChannelOpen {
        interface: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported datalink channel type on {0}")]
    UnsupportedChannel(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("injection handle task failed: {0}")]
    HandleTask(String),

    #[error("write packet: {0}")]
    Send(std::io::Error),
}
