//! The polymorphic value model (spec §3): a tagged `enum Value` realizing
//! what the C source calls "Object" — a pointer to a Type plus per-instance
//! state. Per §9 ("Polymorphic objects"), this crate represents the closed
//! capability table (`hash`, `compare`, `select`, `insert`, `count`,
//! `to_bool`/`to_int`/`to_float`, `print`, `walk`) as plain inherent methods
//! dispatching via `match` rather than a vtable, since the variant set is
//! closed and known at compile time.

use std::fmt;
use std::io::Write as _;

use crate::error::MapError;
use crate::heap::{Heap, HeapId, HeapObject};
use crate::types::fnv_hash_bytes;

/// Stands in for the "pointer to Type" every Object carries (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    None,
    Bool,
    Int,
    Float,
    String,
    List,
    Map,
    Closure,
    Function,
    NativeFunction,
    /// The tag of a Type descriptor itself (spec §3: "its own type is the
    /// 'type of types'"). No [`Value`] variant carries this tag today — this
    /// crate's object model does not materialize Type descriptors as
    /// first-class runtime values — but it completes the tag enumeration
    /// spec §3 names, ready for a `Value::Type` variant if one is ever added.
    Type,
}

/// The atomic-kind classification a Type carries, used by the interpreter
/// to accelerate coercions. `None` for every composite `TypeTag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicKind {
    None,
    Bool,
    Int,
    Float,
    String,
}

impl TypeTag {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::None => "none",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::String => "string",
            TypeTag::List => "list",
            TypeTag::Map => "map",
            TypeTag::Closure => "closure",
            TypeTag::Function => "function",
            TypeTag::NativeFunction => "native_function",
            TypeTag::Type => "type",
        }
    }

    #[must_use]
    pub fn atomic_kind(&self) -> Option<AtomicKind> {
        match self {
            TypeTag::None => Some(AtomicKind::None),
            TypeTag::Bool => Some(AtomicKind::Bool),
            TypeTag::Int => Some(AtomicKind::Int),
            TypeTag::Float => Some(AtomicKind::Float),
            TypeTag::String => Some(AtomicKind::String),
            TypeTag::List | TypeTag::Map | TypeTag::Closure | TypeTag::Function | TypeTag::NativeFunction | TypeTag::Type => {
                None
            }
        }
    }
}

/// A callable backed by a host function rather than bytecode.
///
/// Holds no captured [`Value`]s of its own, so it contributes nothing to
/// [`HeapObject::walk`]; native callables are expected to close over host
/// state outside the managed heap.
#[derive(Clone)]
pub struct NativeFn {
    pub name: std::rc::Rc<str>,
    pub arity: usize,
    pub func: std::rc::Rc<dyn Fn(&[Value]) -> Value>,
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").field("name", &self.name).field("arity", &self.arity).finish()
    }
}

/// A runtime value (spec §3 "Object (abstract)").
///
/// Atomic variants (`None`, `Bool`, `Int`, `Float`, `Str`) are self-contained
/// and never allocate on the [`Heap`]; composite variants hold a [`HeapId`]
/// indexing into it.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(std::rc::Rc<str>),
    List(HeapId),
    Map(HeapId),
    Closure(HeapId),
    Function(HeapId),
    NativeFunction(NativeFn),
}

impl Value {
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::None => TypeTag::None,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Str(_) => TypeTag::String,
            Value::List(_) => TypeTag::List,
            Value::Map(_) => TypeTag::Map,
            Value::Closure(_) => TypeTag::Closure,
            Value::Function(_) => TypeTag::Function,
            Value::NativeFunction(_) => TypeTag::NativeFunction,
        }
    }

    /// The `HeapId` this value addresses, if it is a composite variant.
    #[must_use]
    pub fn heap_id(&self) -> Option<HeapId> {
        match self {
            Value::List(id) | Value::Map(id) | Value::Closure(id) | Value::Function(id) => {
                Some(*id)
            }
            _ => None,
        }
    }

    /// `hash` capability (spec §3). `None` for types with no hash capability
    /// (every composite variant, matching Python-style "unhashable mutable
    /// container" semantics).
    #[must_use]
    pub fn hash(&self) -> Option<u64> {
        match self {
            Value::None => Some(fnv_hash_bytes(b"none")),
            Value::Bool(b) => Some(fnv_hash_bytes(&[u8::from(*b)])),
            Value::Int(i) => Some(fnv_hash_bytes(&i.to_le_bytes())),
            Value::Float(f) => Some(fnv_hash_bytes(&f.to_bits().to_le_bytes())),
            Value::Str(s) => Some(fnv_hash_bytes(s.as_bytes())),
            _ => None,
        }
    }

    /// `compare` capability (spec §3): structural equality. Returns `None`
    /// ("incomparable") only when one side has no compare capability at
    /// all (the composite types); cross-type atomic comparisons are simply
    /// unequal rather than an error.
    #[must_use]
    pub fn compare(&self, other: &Value) -> Option<bool> {
        use Value::{Bool, Float, Int, None as VNone, Str};
        match (self, other) {
            (VNone, VNone) => Some(true),
            (Bool(a), Bool(b)) => Some(a == b),
            (Int(a), Int(b)) => Some(a == b),
            (Float(a), Float(b)) => Some(a.to_bits() == b.to_bits()),
            (Str(a), Str(b)) => Some(a == b),
            (VNone | Bool(_) | Int(_) | Float(_) | Str(_), VNone | Bool(_) | Int(_) | Float(_) | Str(_)) => {
                Some(false)
            }
            _ => std::option::Option::None,
        }
    }

    /// `copy` capability (spec §3, resolved in §9 "Map key copy"): every key
    /// type usable in a [`crate::types::Map`] here is immutable, so `Clone`
    /// is always a safe substitute for a deep copy.
    #[must_use]
    pub fn copy_for_key(&self) -> Value {
        self.clone()
    }

    #[must_use]
    pub fn to_bool(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) | Value::Closure(_) | Value::Function(_) | Value::NativeFunction(_) => {
                true
            }
        }
    }

    #[must_use]
    pub fn to_int(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Int(i) => Some(*i),
            #[allow(clippy::cast_possible_truncation)]
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_float(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(f64::from(*b)),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// `count` capability: cardinality for collections.
    pub fn count(&self, heap: &Heap) -> Option<usize> {
        match self {
            Value::List(id) => match heap.get(*id)? {
                HeapObject::List(list) => Some(list.len()),
                _ => std::option::Option::None,
            },
            Value::Map(id) => match heap.get(*id)? {
                HeapObject::Map(map) => Some(map.count()),
                _ => std::option::Option::None,
            },
            _ => std::option::Option::None,
        }
    }

    /// `select` capability: `self[key]`.
    pub fn select(&self, key: &Value, heap: &Heap) -> Result<Option<Value>, MapError> {
        match self {
            Value::List(id) => {
                let Some(HeapObject::List(list)) = heap.get(*id) else { return Ok(None) };
                let Some(index) = key.to_int() else { return Ok(None) };
                Ok(list.get(index))
            }
            Value::Map(id) => {
                let Some(HeapObject::Map(map)) = heap.get(*id) else { return Ok(None) };
                map.select(key)
            }
            _ => Ok(None),
        }
    }

    /// `insert` capability: `self[key] = val`, or append for a list when
    /// `key` equals `count(self)` (spec §3 "List": "insert writes or
    /// appends at `count`").
    pub fn insert(&self, key: &Value, val: Value, heap: &mut Heap) -> Result<(), MapError> {
        match self {
            Value::List(id) => {
                let index = key.to_int().ok_or(MapError::UnhashableKey)?;
                let Some(HeapObject::List(list)) = heap.get_mut(*id) else {
                    return Err(MapError::Oom);
                };
                list.set_or_push(index, val);
                Ok(())
            }
            Value::Map(id) => {
                let Some(HeapObject::Map(map)) = heap.get_mut(*id) else {
                    return Err(MapError::Oom);
                };
                map.insert(key.copy_for_key(), val)
            }
            _ => Err(MapError::UnhashableKey),
        }
    }

    /// `print` capability: a human-readable rendering, written directly to
    /// `sink` rather than building an intermediate `String` (matching the
    /// teacher's streaming-print convention for large structures).
    pub fn print(&self, sink: &mut dyn std::io::Write, heap: &Heap) -> std::io::Result<()> {
        match self {
            Value::None => write!(sink, "none"),
            Value::Bool(b) => write!(sink, "{b}"),
            Value::Int(i) => write!(sink, "{i}"),
            Value::Float(f) => write!(sink, "{f}"),
            Value::Str(s) => write!(sink, "{s}"),
            Value::List(id) => {
                write!(sink, "[")?;
                if let Some(HeapObject::List(list)) = heap.get(*id) {
                    for (i, item) in list.items().iter().enumerate() {
                        if i > 0 {
                            write!(sink, ", ")?;
                        }
                        item.print(sink, heap)?;
                    }
                }
                write!(sink, "]")
            }
            Value::Map(id) => {
                write!(sink, "{{")?;
                if let Some(HeapObject::Map(map)) = heap.get(*id) {
                    for (i, (k, v)) in map.entries().enumerate() {
                        if i > 0 {
                            write!(sink, ", ")?;
                        }
                        k.print(sink, heap)?;
                        write!(sink, ": ")?;
                        v.print(sink, heap)?;
                    }
                }
                write!(sink, "}}")
            }
            Value::Closure(_) => write!(sink, "<closure>"),
            Value::Function(_) => write!(sink, "<function>"),
            Value::NativeFunction(nf) => write!(sink, "<native {}>", nf.name),
        }
    }
}
