pub mod input_box;
pub mod message;
pub mod message_list;

pub use input_box::{INPUT_HEIGHT, InputBox, InputEvent};
pub use message_list::{MessageList, MessageListState};
