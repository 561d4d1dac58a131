use crate::drivers::fsp::event::KeyPress;

/// A [InputCommand] is a message that can be sent to a [super::service::TouchpadService]
/// over a channel.
#[derive(Debug, Clone)]
pub enum InputCommand {
    /// One byte received from the pad
    Byte(u8),
    /// Key press reported by the keyboard driver
    Key(KeyPress),
    /// Start or stop packet reporting
    Enable(bool),
    /// Report clicks made by pressing on the pad surface
    SetClicking(bool),
    Stop,
}
