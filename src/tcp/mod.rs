pub mod byte_stream;
pub mod flags;
pub mod message;
pub mod reassembler;
pub mod receiver;
pub mod sender;
pub mod timer;
pub mod wrap32;

// -- Re-export structs for more concise usage

pub use byte_stream::ByteStream;
pub use flags::TcpFlags;
pub use message::{TcpReceiverMessage, TcpSenderMessage};
pub use reassembler::Reassembler;
pub use receiver::TcpReceiver;
pub use sender::TcpSender;
pub use timer::RetransmissionTimer;
pub use wrap32::Wrap32;
