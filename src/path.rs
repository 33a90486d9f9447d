//! Response-tree coordinates.
//!
//! [`Path`] is an immutable cons-list, the same shape as juniper's
//! `executor::FieldPath`: cheap to clone (an `Arc` bump) and cheap to extend
//! one segment at a time as the executor descends into fields and list
//! elements.

use std::sync::Arc;

/// One step of a [`Path`]: either a response key or a list index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// A response key, i.e. a field's alias or name.
    Key(Arc<str>),
    /// A zero-based index into a list.
    Index(usize),
}

impl serde::Serialize for PathSegment {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        match self {
            Self::Key(k) => serializer.serialize_str(k),
            Self::Index(i) => serializer.serialize_u64(*i as u64),
        }
    }
}

#[derive(Debug)]
enum Node {
    Root,
    Segment(PathSegment, Path),
}

/// Location of a value within the response tree.
///
/// The root path is empty. Every resolver invocation receives the `Path` to
/// the field it is resolving via [`crate::ResolveInfo::path`].
#[derive(Clone, Debug)]
pub struct Path(Arc<Node>);

impl Path {
    /// The empty, root path.
    pub fn root() -> Self {
        Self(Arc::new(Node::Root))
    }

    /// Extends this path with a response key.
    #[must_use]
    pub fn push_key(&self, key: impl Into<Arc<str>>) -> Self {
        Self(Arc::new(Node::Segment(PathSegment::Key(key.into()), self.clone())))
    }

    /// Extends this path with a list index.
    #[must_use]
    pub fn push_index(&self, index: usize) -> Self {
        Self(Arc::new(Node::Segment(PathSegment::Index(index), self.clone())))
    }

    /// The last segment appended to this path, if any.
    pub fn last(&self) -> Option<&PathSegment> {
        match &*self.0 {
            Node::Root => None,
            Node::Segment(seg, _) => Some(seg),
        }
    }

    /// Collects this path into a flat, root-to-leaf vector of segments.
    pub fn to_vec(&self) -> Vec<PathSegment> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<PathSegment>) {
        if let Node::Segment(seg, parent) = &*self.0 {
            parent.collect_into(out);
            out.push(seg.clone());
        }
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::root()
    }
}
