pub mod nights;
pub mod queues;
pub mod slots;
