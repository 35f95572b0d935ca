//! Traversal configuration

/// Default bound on traversal depth
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Classification options
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Only plain records (not derived from another record type) are
    /// record-like; derived ones traverse as tuples.
    pub strict_records: bool,
    /// Lists are leaves, not a level of nesting
    pub lists_are_atomic: bool,
}

impl ClassifierConfig {
    /// Data-pipeline classification: lists are atomic
    pub fn for_data() -> Self {
        ClassifierConfig {
            strict_records: false,
            lists_are_atomic: true,
        }
    }
}

/// Engine configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestConfig {
    /// Deepest node a traversal may visit (root is depth 0)
    pub max_depth: usize,
    /// Classification options
    pub classifier: ClassifierConfig,
    /// Never expand composites, whatever the caller asks for
    pub atomic_composites: bool,
}

impl Default for NestConfig {
    fn default() -> Self {
        NestConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            classifier: ClassifierConfig::default(),
            atomic_composites: false,
        }
    }
}

impl NestConfig {
    /// Data-pipeline profile: lists are leaves and composites are atomic
    pub fn for_data() -> Self {
        NestConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            classifier: ClassifierConfig::for_data(),
            atomic_composites: true,
        }
    }

    /// Strict record classification
    pub fn strict() -> Self {
        NestConfig {
            classifier: ClassifierConfig {
                strict_records: true,
                lists_are_atomic: false,
            },
            ..NestConfig::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }
}
