/// Retransmission timer with exponential backoff.
///
/// Time only advances through `tick`. The timer is idle until `active()`,
/// and is expired once the elapsed time reaches the current RTO.
#[derive(Debug, Clone)]
pub struct RetransmissionTimer {
    initial_rto: u64,
    current_rto: u64,
    elapsed: u64,
    running: bool,
    consecutive_retransmissions: u64,
}

impl RetransmissionTimer {
    pub fn new(initial_rto: u64) -> Self {
        RetransmissionTimer {
            initial_rto,
            current_rto: initial_rto,
            elapsed: 0,
            running: false,
            consecutive_retransmissions: 0,
        }
    }

    /// Start counting from zero, unless already running
    pub fn active(&mut self) {
        if !self.running {
            self.running = true;
            self.elapsed = 0;
        }
    }

    pub fn tick(&mut self, ms_since_last_tick: u64) {
        if self.running {
            self.elapsed = self.elapsed.saturating_add(ms_since_last_tick);
        }
    }

    pub fn is_expired(&self) -> bool {
        self.running && self.elapsed >= self.current_rto
    }

    /// Clear elapsed time; the RTO is left alone
    pub fn reset(&mut self) {
        self.elapsed = 0;
    }

    /// Double the RTO
    pub fn timeout(&mut self) {
        self.current_rto = self.current_rto.saturating_mul(2);
    }

    /// Back to the initial RTO with nothing elapsed, and stopped
    pub fn restart(&mut self) {
        self.current_rto = self.initial_rto;
        self.elapsed = 0;
        self.running = false;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset_retransmit(&mut self) {
        self.consecutive_retransmissions = 0;
    }

    pub fn add_retransmit(&mut self) {
        self.consecutive_retransmissions += 1;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_rto(&self) -> u64 {
        self.current_rto
    }

    pub fn consecutive_retransmissions(&self) -> u64 {
        self.consecutive_retransmissions
    }
}

// -- Unit tests --

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_timer_never_expires() {
        let mut timer = RetransmissionTimer::new(100);
        timer.tick(1000);
        assert!(!timer.is_expired());
        assert!(!timer.is_running());
    }

    #[test]
    fn test_expires_at_rto() {
        let mut timer = RetransmissionTimer::new(100);
        timer.active();
        timer.tick(99);
        assert!(!timer.is_expired());
        timer.tick(1);
        assert!(timer.is_expired());
    }

    #[test]
    fn test_active_does_not_restart_running_timer() {
        let mut timer = RetransmissionTimer::new(100);
        timer.active();
        timer.tick(60);
        timer.active();
        timer.tick(40);
        assert!(timer.is_expired());
    }

    #[test]
    fn test_backoff_and_restart() {
        let mut timer = RetransmissionTimer::new(100);
        timer.active();
        timer.tick(100);
        assert!(timer.is_expired());

        timer.reset();
        timer.timeout();
        timer.add_retransmit();
        assert_eq!(timer.current_rto(), 200);
        assert_eq!(timer.consecutive_retransmissions(), 1);
        timer.tick(199);
        assert!(!timer.is_expired());
        timer.tick(1);
        assert!(timer.is_expired());

        timer.restart();
        timer.reset_retransmit();
        assert!(!timer.is_running());
        assert_eq!(timer.current_rto(), 100);
        assert_eq!(timer.consecutive_retransmissions(), 0);
    }
}
