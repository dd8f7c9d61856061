// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Object-level optimisation of an output document: merge byte-identical
// streams so repeated fonts and images are stored once.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Object, ObjectId};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Replace every stream that is byte-identical (dictionary and content) to an
/// earlier one with a reference to the earlier one. Returns how many streams
/// were merged. Unreachable duplicates are left for `prune_objects`.
pub(crate) fn deduplicate_streams(document: &mut lopdf::Document) -> usize {
    let mut canonical: HashMap<[u8; 32], ObjectId> = HashMap::new();
    let mut replaced: BTreeMap<ObjectId, ObjectId> = BTreeMap::new();

    // BTreeMap iteration is ordered, so the lowest id wins.
    for (id, object) in &document.objects {
        let Object::Stream(stream) = object else {
            continue;
        };
        let mut hasher = Sha256::new();
        hash_dictionary(&mut hasher, &stream.dict);
        hash_bytes(&mut hasher, &stream.content);
        let digest: [u8; 32] = hasher.finalize().into();

        match canonical.get(&digest) {
            Some(first) => {
                replaced.insert(*id, *first);
            }
            None => {
                canonical.insert(digest, *id);
            }
        }
    }

    if replaced.is_empty() {
        return 0;
    }

    for object in document.objects.values_mut() {
        rewrite_references(object, &replaced);
    }
    for (_, value) in document.trailer.iter_mut() {
        rewrite_references(value, &replaced);
    }
    for id in replaced.keys() {
        document.objects.remove(id);
    }

    debug!(merged = replaced.len(), "Duplicate streams merged");
    replaced.len()
}

/// Feed `bytes` with a length prefix so adjacent fields cannot run together.
fn hash_bytes(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

fn hash_dictionary(hasher: &mut Sha256, dict: &Dictionary) {
    hasher.update((dict.len() as u64).to_be_bytes());
    for (key, value) in dict.iter() {
        hash_bytes(hasher, key);
        hash_object(hasher, value);
    }
}

/// Hash the raw value of `object`, one tag byte per variant.
fn hash_object(hasher: &mut Sha256, object: &Object) {
    match object {
        Object::Null => hasher.update([0]),
        Object::Boolean(value) => hasher.update([1, u8::from(*value)]),
        Object::Integer(value) => {
            hasher.update([2]);
            hasher.update(value.to_be_bytes());
        }
        Object::Real(value) => {
            hasher.update([3]);
            hasher.update(value.to_bits().to_be_bytes());
        }
        Object::Name(name) => {
            hasher.update([4]);
            hash_bytes(hasher, name);
        }
        Object::String(bytes, _) => {
            hasher.update([5]);
            hash_bytes(hasher, bytes);
        }
        Object::Array(items) => {
            hasher.update([6]);
            hasher.update((items.len() as u64).to_be_bytes());
            for item in items {
                hash_object(hasher, item);
            }
        }
        Object::Dictionary(dict) => {
            hasher.update([7]);
            hash_dictionary(hasher, dict);
        }
        Object::Stream(stream) => {
            hasher.update([8]);
            hash_dictionary(hasher, &stream.dict);
            hash_bytes(hasher, &stream.content);
        }
        Object::Reference((number, generation)) => {
            hasher.update([9]);
            hasher.update(number.to_be_bytes());
            hasher.update(generation.to_be_bytes());
        }
    }
}

fn rewrite_references(object: &mut Object, replaced: &BTreeMap<ObjectId, ObjectId>) {
    match object {
        Object::Reference(id) => {
            if let Some(target) = replaced.get(id) {
                *id = *target;
            }
        }
        Object::Array(items) => {
            for item in items {
                rewrite_references(item, replaced);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                rewrite_references(value, replaced);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                rewrite_references(value, replaced);
            }
        }
        _ => {}
    }
}
