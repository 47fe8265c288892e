/// What the running environment can do for the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Background threads can be spawned.
    pub workers: bool,
    /// Reference-counted buffers may cross to a worker.
    pub shared_memory: bool,
}

impl HostCapabilities {
    pub fn detect() -> Self {
        if cfg!(target_family = "wasm") {
            Self {
                workers: false,
                shared_memory: cfg!(target_feature = "atomics"),
            }
        } else {
            Self {
                workers: true,
                shared_memory: true,
            }
        }
    }

    /// Host that can only run inline.
    pub fn inline_only() -> Self {
        Self {
            workers: false,
            shared_memory: false,
        }
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_family = "wasm"))]
    #[test]
    fn native_hosts_have_workers_and_shared_memory() {
        let host = HostCapabilities::detect();
        assert!(host.workers);
        assert!(host.shared_memory);
    }

    #[test]
    fn inline_only_has_nothing() {
        let host = HostCapabilities::inline_only();
        assert!(!host.workers);
        assert!(!host.shared_memory);
    }
}
