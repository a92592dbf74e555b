use crate::dao::models::ScoreRecord;

/// Anything that can name a tracked identity.
///
/// Hosts implement this for their player handles so the service can be
/// called with either a raw identity string or a connected player.
pub trait Principal {
    /// Stable identity used as the ranking key.
    fn identity(&self) -> &str;
}

impl Principal for str {
    fn identity(&self) -> &str {
        self
    }
}

impl Principal for String {
    fn identity(&self) -> &str {
        self
    }
}

impl Principal for ScoreRecord {
    fn identity(&self) -> &str {
        ScoreRecord::identity(self)
    }
}

impl<P: Principal + ?Sized> Principal for &P {
    fn identity(&self) -> &str {
        (**self).identity()
    }
}
