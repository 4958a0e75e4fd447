pub mod cli;
pub mod input;
pub mod log;
pub mod storage;
pub mod svc;

#[cfg(test)]
mod test_utils;
