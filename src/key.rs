use std::any::type_name;
use std::fmt;

/// Prefixes of the built-in pointer types, longest first so `&mut ` wins over `&`.
const POINTER_PREFIXES: &[&str] = &["&mut ", "&", "*const ", "*mut "];

/// Owning smart pointers that are peeled like references.
const WRAPPERS: &[&str] = &["alloc::boxed::Box<", "alloc::rc::Rc<", "alloc::sync::Arc<"];

/// The identity under which a [`Container`](crate::Container) stores a value.
///
/// A key is derived from a type alone: every outer indirection layer (`&T`,
/// `&mut T`, `*const T`, `*mut T`, `Box<T>`, `Rc<T>`, `Arc<T>`) is peeled off,
/// and the fully-qualified name of what remains becomes the key. Two types
/// whose keys are equal share one slot in a container.
///
/// # Examples
///
/// ```
/// use sovran_registry::TypeKey;
/// use std::sync::Arc;
///
/// struct Database;
///
/// let key = TypeKey::of::<Database>();
/// assert_eq!(key.name(), "Database");
/// assert_eq!(key, TypeKey::of::<Arc<Database>>());
/// assert_eq!(key, TypeKey::of::<&Box<Database>>());
/// assert_eq!(format!("{}{}", key.module_path(), key.name()), key.as_str());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey {
    full: &'static str,
    split: usize,
}

impl TypeKey {
    /// Derives the key for `T`.
    pub fn of<T: ?Sized>() -> Self {
        let full = strip_indirection(type_name::<T>());
        Self {
            full,
            split: module_split(full),
        }
    }

    /// The whole key, `module_path()` immediately followed by `name()`.
    pub fn as_str(&self) -> &'static str {
        self.full
    }

    /// Module path of the element type, including the trailing `::`.
    ///
    /// Empty for primitives, trait objects, tuples, arrays and slices.
    pub fn module_path(&self) -> &'static str {
        &self.full[..self.split]
    }

    /// Unqualified name of the element type, with any generic arguments.
    pub fn name(&self) -> &'static str {
        &self.full[self.split..]
    }
}

/// Shorthand for [`TypeKey::of`].
pub fn type_key<T: ?Sized>() -> TypeKey {
    TypeKey::of::<T>()
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full)
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.full).finish()
    }
}

fn strip_indirection(mut name: &'static str) -> &'static str {
    loop {
        name = name.trim();
        if let Some(rest) = POINTER_PREFIXES.iter().find_map(|p| name.strip_prefix(*p)) {
            name = rest;
            continue;
        }
        match WRAPPERS
            .iter()
            .find_map(|w| name.strip_prefix(*w))
            .and_then(first_argument)
        {
            Some(inner) => name = inner,
            None => return name,
        }
    }
}

/// Returns the first generic argument from the text following `Wrapper<`.
///
/// Stops at a top-level `,` so a trailing allocator parameter is ignored.
fn first_argument(args: &'static str) -> Option<&'static str> {
    let mut depth = 0usize;
    let mut prev = '\0';
    for (i, c) in args.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            // `->` in fn pointer types is not a closing bracket
            '>' if prev == '-' => {}
            '>' | ')' | ']' if depth > 0 => depth -= 1,
            '>' => return args[i + 1..].is_empty().then(|| &args[..i]),
            ',' if depth == 0 => return Some(&args[..i]),
            _ => {}
        }
        prev = c;
    }
    None
}

fn module_split(full: &str) -> usize {
    if full.starts_with("dyn ") {
        return 0;
    }
    let head = full
        .find(|c: char| matches!(c, '<' | '(' | '[' | ' ' | ';'))
        .map_or(full, |end| &full[..end]);
    head.rfind("::").map_or(0, |i| i + 2)
}
