use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Reference to a docker image in an external registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DockerImage(pub String);

impl Display for DockerImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a component build type to the builder image used when the cluster
/// has no shared image stream for it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeImages(HashMap<String, DockerImage>);

impl RuntimeImages {
    /// Returns `None` for an empty or unknown build type.
    pub fn resolve(&self, build_type: &str) -> Option<&DockerImage> {
        if build_type.is_empty() {
            return None;
        }
        self.0.get(build_type)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RuntimeImages {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(build_type, image)| (build_type.into(), DockerImage(image.into())))
                .collect(),
        )
    }
}
