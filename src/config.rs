/// Settings for a [`Multiplexer`](crate::multiplexer::Multiplexer) that are
/// left as implementation freedom rather than documented call behaviour.
///
/// A small `Default`-able settings struct consumed once, at construction.
#[derive(Debug, Clone)]
pub struct MultiplexerConfig {
    /// Initial capacity of a call's [`WaitTable`](crate::wait_table::WaitTable),
    /// to avoid a reallocation on the common one-or-two-fd case.
    pub wait_table_capacity: usize,

    /// An optional cap on the number of park/rescan cycles a single call
    /// may take before it is treated as a resource error.
    ///
    /// `None` (the default) means unbounded, leaving the rescan loop
    /// untouched. This is a safety valve against a
    /// misbehaving object whose `poll` never reports readiness and never
    /// lets the deadline branch fire (e.g. a non-monotonic clock); it
    /// changes no documented return value while unset.
    pub spurious_wake_budget: Option<u32>,
}

impl Default for MultiplexerConfig {
    fn default() -> Self {
        Self {
            wait_table_capacity: 4,
            spurious_wake_budget: None,
        }
    }
}
