use std::collections::HashMap;

/// Tells our own disk writes apart from changes made by someone else.
///
/// Each write adds one credit for its path; each modify notification for
/// that path spends one. Credits stack, so two writes that land before
/// either notification are both absorbed.
#[derive(Debug, Default)]
pub struct EchoGuard {
    credits: HashMap<String, u32>,
}

impl EchoGuard {
    /// Record a write we are about to perform.
    pub fn arm(&mut self, path: &str) {
        *self.credits.entry(path.to_string()).or_default() += 1;
    }

    /// Give back the credit of a write that never happened.
    pub fn disarm(&mut self, path: &str) {
        self.spend(path);
    }

    /// True if this notification is the echo of one of our writes.
    pub fn consume(&mut self, path: &str) -> bool {
        self.spend(path)
    }

    /// Forget credits for every path but `path`. Their notifications are no
    /// longer watched for.
    pub fn retain(&mut self, path: &str) {
        self.credits.retain(|p, _| p == path);
    }

    fn spend(&mut self, path: &str) -> bool {
        let Some(n) = self.credits.get_mut(path) else {
            return false;
        };
        *n -= 1;
        if *n == 0 {
            self.credits.remove(path);
        }
        true
    }

    #[cfg(test)]
    pub fn outstanding(&self, path: &str) -> u32 {
        self.credits.get(path).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unarmed_guard_lets_notifications_through() {
        let mut g = EchoGuard::default();
        assert!(!g.consume("a.md"));
    }

    #[test]
    fn test_one_credit_per_write() {
        let mut g = EchoGuard::default();
        g.arm("a.md");
        g.arm("a.md");
        assert!(g.consume("a.md"));
        assert!(g.consume("a.md"));
        assert!(!g.consume("a.md"));
    }

    #[test]
    fn test_credits_belong_to_their_path() {
        let mut g = EchoGuard::default();
        g.arm("a.md");
        assert!(!g.consume("b.md"));
        assert_eq!(g.outstanding("a.md"), 1);
    }

    #[test]
    fn test_disarm_returns_credit() {
        let mut g = EchoGuard::default();
        g.arm("a.md");
        g.disarm("a.md");
        g.disarm("a.md");
        assert_eq!(g.outstanding("a.md"), 0);
        assert!(!g.consume("a.md"));
    }

    #[test]
    fn test_retain_drops_other_paths() {
        let mut g = EchoGuard::default();
        g.arm("a.md");
        g.arm("b.md");
        g.retain("b.md");
        assert!(!g.consume("a.md"));
        assert!(g.consume("b.md"));
    }
}
