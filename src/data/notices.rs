//! Static notice feed for the alerts screen

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Danger,
    Warning,
    Info,
}

/// One entry in the notice feed
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub kind: NoticeKind,
    /// Relative age as shown to the user
    pub age: &'static str,
    pub read: bool,
}

/// Seed notices, newest first
pub fn all_notices() -> Vec<Notice> {
    vec![
        Notice {
            id: "1",
            title: "Flash Flood Warning",
            message: "Heavy rainfall expected. Avoid low-lying areas and stay indoors.",
            kind: NoticeKind::Danger,
            age: "5 min ago",
            read: false,
        },
        Notice {
            id: "2",
            title: "High Wind Advisory",
            message: "Wind speeds up to 60 km/h expected. Secure loose objects.",
            kind: NoticeKind::Warning,
            age: "1 hr ago",
            read: false,
        },
        Notice {
            id: "3",
            title: "Fire Risk Alert",
            message: "Elevated fire risk in northern region. Exercise caution.",
            kind: NoticeKind::Warning,
            age: "3 hrs ago",
            read: true,
        },
        Notice {
            id: "4",
            title: "Shelter Update",
            message: "New emergency shelter opened at Central Community Center.",
            kind: NoticeKind::Info,
            age: "5 hrs ago",
            read: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_has_two_unread() {
        let notices = all_notices();
        assert_eq!(notices.len(), 4);
        assert_eq!(notices.iter().filter(|n| !n.read).count(), 2);
    }
}
