use std::sync::atomic::{AtomicU16, Ordering};

use crate::automation::collaborators::Configuration;

/// Lock-free source of transaction ids
///
/// Ids count up from the initial value and wrap from 0xFFFF back to 0.
#[derive(Debug, Default)]
pub struct TransactionIdGenerator {
    next: AtomicU16,
}

impl TransactionIdGenerator {
    /// start counting at `first`
    pub fn starting_at(first: u16) -> Self {
        Self {
            next: AtomicU16::new(first),
        }
    }

    /// take the next id
    pub fn next_id(&self) -> u16 {
        // fetch_add wraps on overflow
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// [`Configuration`] with fixed values
#[derive(Debug)]
pub struct StaticConfiguration {
    delay_between_commands: u64,
    unit_address: u8,
    transaction_ids: TransactionIdGenerator,
}

impl StaticConfiguration {
    /// `delay_between_commands` is in seconds
    pub fn new(delay_between_commands: u64, unit_address: u8) -> Self {
        Self {
            delay_between_commands,
            unit_address,
            transaction_ids: TransactionIdGenerator::default(),
        }
    }
}

impl Configuration for StaticConfiguration {
    fn delay_between_commands(&self) -> u64 {
        self.delay_between_commands
    }

    fn unit_address(&self) -> u8 {
        self.unit_address
    }

    fn next_transaction_id(&self) -> u16 {
        self.transaction_ids.next_id()
    }
}
