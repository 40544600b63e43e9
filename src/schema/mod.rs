pub mod block;
pub mod character;
pub mod conversation;
