//! Copying page object graphs between PDF documents.

use std::collections::HashMap;
use std::sync::Arc;

use lopdf::{Dictionary, Document as LoDocument, Object, ObjectId, Stream};

use crate::error::Result;
use crate::model::VectorPage;

/// Page attributes that may be inherited from an ancestor `/Pages` node.
const INHERITABLE: &[&[u8]] = &[b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Upper bound on page tree depth when walking `/Parent` links.
const MAX_TREE_DEPTH: usize = 64;

/// Object id mapping for one source document.
struct SourceMap {
    // keeps the source alive so its address stays a valid key
    _source: Arc<LoDocument>,
    ids: HashMap<ObjectId, ObjectId>,
}

/// Imports pages from parsed source documents into a target document.
///
/// Every object is copied at most once per source, so resources shared
/// between pages (fonts, images, form XObjects) stay shared in the output.
/// Cyclic references are followed safely.
///
/// References to other pages resolve to their copies when those pages are
/// part of the output (see [`reserve`](Self::reserve)) and to `null`
/// otherwise, so links never drag unselected pages along.
pub(crate) struct PageImporter<'a> {
    target: &'a mut LoDocument,
    parent: ObjectId,
    sources: HashMap<usize, SourceMap>,
}

impl<'a> PageImporter<'a> {
    /// Create an importer whose pages hang off the `/Pages` node `parent`.
    pub(crate) fn new(target: &'a mut LoDocument, parent: ObjectId) -> Self {
        Self {
            target,
            parent,
            sources: HashMap::new(),
        }
    }

    /// The document being written.
    pub(crate) fn target(&mut self) -> &mut LoDocument {
        &mut *self.target
    }

    /// Allocate the output id for a page before any page is copied.
    ///
    /// The first reservation of a source page becomes the target of
    /// references to it from other imported pages.
    pub(crate) fn reserve(&mut self, page: &VectorPage) -> ObjectId {
        let new_id = self.target.new_object_id();
        self.sources
            .entry(source_key(page.source()))
            .or_insert_with(|| SourceMap {
                _source: Arc::clone(page.source()),
                ids: HashMap::new(),
            })
            .ids
            .entry(page.object_id())
            .or_insert(new_id);
        new_id
    }

    /// Copy a page dictionary and everything it references into `new_id`.
    ///
    /// Inherited attributes are materialized on the copy. `rotation`
    /// replaces the source `/Rotate`.
    pub(crate) fn import(&mut self, new_id: ObjectId, page: &VectorPage, rotation: u16) -> Result<()> {
        let source = Arc::clone(page.source());
        let page_dict = source.get_dictionary(page.object_id())?;

        let Self {
            target,
            parent,
            sources,
        } = self;
        let map = &mut sources
            .entry(source_key(&source))
            .or_insert_with(|| SourceMap {
                _source: Arc::clone(&source),
                ids: HashMap::new(),
            })
            .ids;

        let mut dict = Dictionary::new();
        for (key, value) in page_dict.iter() {
            if key.as_slice() == b"Parent" || INHERITABLE.contains(&key.as_slice()) {
                continue;
            }
            let value = clone_value(&source, target, map, value);
            dict.set(key.clone(), value);
        }

        for key in [&b"Resources"[..], b"MediaBox", b"CropBox"] {
            if let Some(value) = inherited_attribute(&source, page_dict, key) {
                let value = clone_value(&source, target, map, value);
                dict.set(key.to_vec(), value);
            }
        }
        if !dict.has(b"Resources") {
            dict.set("Resources", Dictionary::new());
        }
        if rotation != 0 {
            dict.set("Rotate", rotation as i64);
        }
        dict.set("Type", "Page");
        dict.set("Parent", *parent);

        target.objects.insert(new_id, Object::Dictionary(dict));
        log::debug!(
            "Imported source page {} {:?} as {:?}",
            page.source_page(),
            page.object_id(),
            new_id
        );
        Ok(())
    }
}

fn source_key(source: &Arc<LoDocument>) -> usize {
    Arc::as_ptr(source) as usize
}

fn clone_value(
    source: &LoDocument,
    target: &mut LoDocument,
    map: &mut HashMap<ObjectId, ObjectId>,
    value: &Object,
) -> Object {
    match value {
        Object::Reference(id) => clone_reference(source, target, map, *id),
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| clone_value(source, target, map, item))
                .collect(),
        ),
        Object::Dictionary(dict) => Object::Dictionary(clone_dict(source, target, map, dict)),
        Object::Stream(stream) => {
            let dict = clone_dict(source, target, map, &stream.dict);
            let already_filtered = dict.has(b"Filter");
            let mut copy = Stream::new(dict, stream.content.clone());
            copy.allows_compression = stream.allows_compression && !already_filtered;
            Object::Stream(copy)
        }
        other => other.clone(),
    }
}

fn clone_dict(
    source: &LoDocument,
    target: &mut LoDocument,
    map: &mut HashMap<ObjectId, ObjectId>,
    dict: &Dictionary,
) -> Dictionary {
    let mut copy = Dictionary::new();
    for (key, value) in dict.iter() {
        let value = clone_value(source, target, map, value);
        copy.set(key.clone(), value);
    }
    copy
}

fn clone_reference(
    source: &LoDocument,
    target: &mut LoDocument,
    map: &mut HashMap<ObjectId, ObjectId>,
    id: ObjectId,
) -> Object {
    if let Some(new_id) = map.get(&id) {
        return Object::Reference(*new_id);
    }

    let object = match source.get_object(id) {
        Ok(object) => object,
        Err(e) => {
            log::warn!("Dangling reference {:?} replaced with null: {}", id, e);
            return Object::Null;
        }
    };
    if is_page_tree_node(object) {
        return Object::Null;
    }

    // registered before recursing so cycles terminate
    let new_id = target.new_object_id();
    map.insert(id, new_id);
    let copy = clone_value(source, target, map, object);
    target.objects.insert(new_id, copy);
    Object::Reference(new_id)
}

fn is_page_tree_node(object: &Object) -> bool {
    object
        .as_dict()
        .ok()
        .and_then(|dict| dict.get(b"Type").ok())
        .and_then(|t| t.as_name_str().ok())
        .is_some_and(|t| t == "Page" || t == "Pages")
}

/// Look up a page attribute, walking up the page tree for inheritable keys.
///
/// The value is returned as stored; use [`resolve`] to follow a reference.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a LoDocument,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut dict = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        if !INHERITABLE.contains(&key) {
            return None;
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Follow a reference to its object; other objects are returned as-is.
pub(crate) fn resolve<'a>(doc: &'a LoDocument, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}
