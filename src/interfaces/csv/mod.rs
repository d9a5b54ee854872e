pub mod charge_writer;
pub mod order_reader;
