use super::PointGrant;

/// Default number of grants shown per catalog page.
pub const DEFAULT_CATALOG_PAGE_SIZE: usize = 10;

/// Ordered collection of the grants known to the host.
///
/// Catalogs are plain lists: callers register grants explicitly and the
/// listing order is registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsCatalog {
    grants: Vec<PointGrant>,
}

impl PointsCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants shipped for every game mode.
    pub fn standard() -> Self {
        Self {
            grants: vec![
                PointGrant::preset("Victory", "", 1000, false),
                PointGrant::preset("Destroyed core", "", -100, false),
                PointGrant::preset("Build", "", 1, true),
            ],
        }
    }

    /// Per-event grants of the core ranking rules, including the death penalty.
    pub fn core() -> Self {
        Self {
            grants: vec![
                PointGrant::preset("Destroyed core", "", -100, false),
                PointGrant::preset("Player died", "", -10, false),
                PointGrant::preset("Won game", "", 1000, false),
                PointGrant::preset("Build", "", 1, false),
            ],
        }
    }

    /// Win and loss grants for PvP servers.
    pub fn pvp() -> Self {
        Self {
            grants: vec![
                PointGrant::preset("Victory", "", 100, false),
                PointGrant::preset("Defeat", "", -100, false),
            ],
        }
    }

    /// Append a single grant.
    pub fn register(&mut self, grant: PointGrant) {
        self.grants.push(grant);
    }

    /// Append every grant of `other`, keeping its order.
    pub fn extend(&mut self, other: impl IntoIterator<Item = PointGrant>) {
        self.grants.extend(other);
    }

    /// First grant registered under `name`, compared case-insensitively.
    pub fn find(&self, name: &str) -> Option<&PointGrant> {
        self.grants
            .iter()
            .find(|grant| grant.name().eq_ignore_ascii_case(name))
    }

    /// Grants in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PointGrant> {
        self.grants.iter()
    }

    /// Number of registered grants.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Zero-based page of `size` grants. Out of range pages and a zero size
    /// yield an empty slice.
    pub fn page(&self, number: usize, size: usize) -> &[PointGrant] {
        let start = number.saturating_mul(size).min(self.grants.len());
        let end = start.saturating_add(size).min(self.grants.len());
        &self.grants[start..end]
    }
}

impl FromIterator<PointGrant> for PointsCatalog {
    fn from_iter<I: IntoIterator<Item = PointGrant>>(iter: I) -> Self {
        Self {
            grants: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PointsCatalog {
    type Item = PointGrant;
    type IntoIter = std::vec::IntoIter<PointGrant>;

    fn into_iter(self) -> Self::IntoIter {
        self.grants.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_lists_builtin_grants() {
        let catalog = PointsCatalog::standard();
        let names: Vec<_> = catalog.iter().map(PointGrant::name).collect();
        assert_eq!(names, ["Victory", "Destroyed core", "Build"]);
        assert!(catalog.find("build").unwrap().is_silent());
        assert_eq!(catalog.find("destroyed core").unwrap().delta(), -100);
    }

    #[test]
    fn core_catalog_penalises_deaths() {
        let catalog = PointsCatalog::core();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.find("player died").unwrap().delta(), -10);
        assert_eq!(catalog.find("won game").unwrap().delta(), 1000);
        assert!(catalog.iter().all(|grant| grant.description().is_empty()));
    }

    #[test]
    fn extend_keeps_registration_order() {
        let mut catalog = PointsCatalog::new();
        catalog.extend(PointsCatalog::pvp());
        catalog.register(PointGrant::of("Wave survived", 5).unwrap());
        let names: Vec<_> = catalog.iter().map(PointGrant::name).collect();
        assert_eq!(names, ["Victory", "Defeat", "Wave survived"]);
    }

    #[test]
    fn page_slices_the_catalog() {
        let catalog: PointsCatalog = (0..25)
            .map(|i| PointGrant::of(format!("grant-{i}"), i).unwrap())
            .collect();

        assert_eq!(catalog.page(0, DEFAULT_CATALOG_PAGE_SIZE).len(), 10);
        assert_eq!(catalog.page(2, DEFAULT_CATALOG_PAGE_SIZE).len(), 5);
        assert_eq!(catalog.page(2, DEFAULT_CATALOG_PAGE_SIZE)[0].name(), "grant-20");
        assert!(catalog.page(3, DEFAULT_CATALOG_PAGE_SIZE).is_empty());
        assert!(catalog.page(0, 0).is_empty());
        assert!(catalog.page(usize::MAX, usize::MAX).is_empty());
    }
}
