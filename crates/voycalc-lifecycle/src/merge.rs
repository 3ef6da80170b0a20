//! Recursive merge of partial server records into local state.
//!
//! The game server answers lifecycle commands with partial records:
//! only the fields that changed, nested arbitrarily deep. Folding such a
//! fragment into the retained record follows three rules:
//!
//! - scalars (and nulls) overwrite;
//! - nested objects merge recursively;
//! - arrays of objects merge element-wise by a shared `id` field --
//!   matching ids recurse-merge in place, new ids append, and elements
//!   without an `id` always append.
//!
//! Keys listed in `skip` are left untouched at the top level only; the
//! skip list does not propagate into nested merges.

use serde_json::Value;

/// Merge `source` into `target` under the rules above.
///
/// A non-object `source` (or a non-object `target`) leaves `target`
/// unchanged; partial records are always objects.
pub fn merge_into(target: &mut Value, source: &Value, skip: &[&str]) {
    let (Value::Object(target_map), Value::Object(source_map)) = (&mut *target, source) else {
        return;
    };

    for (key, incoming) in source_map {
        if skip.contains(&key.as_str()) {
            continue;
        }
        match incoming {
            Value::Object(_) => {
                let slot = target_map
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Default::default()));
                if !slot.is_object() {
                    *slot = Value::Object(Default::default());
                }
                merge_into(slot, incoming, &[]);
            }
            Value::Array(elements) => match target_map.get_mut(key) {
                Some(Value::Array(existing)) => merge_array(existing, elements),
                _ => {
                    target_map.insert(key.clone(), incoming.clone());
                }
            },
            _ => {
                target_map.insert(key.clone(), incoming.clone());
            }
        }
    }
}

fn merge_array(existing: &mut Vec<Value>, incoming: &[Value]) {
    for element in incoming {
        let Some(id) = element.get("id").filter(|id| !id.is_null()) else {
            existing.push(element.clone());
            continue;
        };
        if let Some(current) = existing.iter_mut().find(|it| it.get("id") == Some(id)) {
            merge_into(current, element, &[]);
        } else {
            existing.push(element.clone());
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
