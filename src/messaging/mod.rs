// Messaging - Lock-free queues between the input, clock and audio threads

pub mod channels;
pub mod command;

pub use channels::{
    ClickConsumer, ClickProducer, CommandConsumer, CommandProducer, create_click_channel,
    create_command_channel,
};
pub use command::{Command, CommandParseError};
