// Communication channels lock-free

use crate::messaging::command::Command;
use crate::sequencer::feedback::ClickType;
use ringbuf::{HeapRb, traits::Split};

pub type CommandProducer = ringbuf::HeapProd<Command>;
pub type CommandConsumer = ringbuf::HeapCons<Command>;

pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<Command>::new(capacity);
    rb.split()
}

/// Click triggers, clock thread -> audio callback
pub type ClickProducer = ringbuf::HeapProd<ClickType>;
pub type ClickConsumer = ringbuf::HeapCons<ClickType>;

pub fn create_click_channel(capacity: usize) -> (ClickProducer, ClickConsumer) {
    let rb = HeapRb::<ClickType>::new(capacity);
    rb.split()
}
