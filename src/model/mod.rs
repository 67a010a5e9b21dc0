// Program model - some accessors reserved for future use
#![allow(dead_code)]

mod body;

pub use body::{InsnRef, MethodBody};

use std::collections::{HashMap, HashSet};

/// Identifier for a class in the scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

/// Identifier for a method in the scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(usize);

/// Identifier for a field in the scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(usize);

impl ClassId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl MethodId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl FieldId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// A resolved reference to any element kind
///
/// Flag queries are generic over this, so class/method/field share one
/// code path instead of three copies of the predicate logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Class(ClassId),
    Method(MethodId),
    Field(FieldId),
}

impl From<ClassId> for ElementRef {
    fn from(id: ClassId) -> Self {
        ElementRef::Class(id)
    }
}

impl From<MethodId> for ElementRef {
    fn from(id: MethodId) -> Self {
        ElementRef::Method(id)
    }
}

impl From<FieldId> for ElementRef {
    fn from(id: FieldId) -> Self {
        ElementRef::Field(id)
    }
}

/// A class in the program under optimization
#[derive(Debug, Clone)]
pub struct ClassDef {
    /// Dotted fully qualified name (e.g., "com.example.app.MainActivity")
    pub name: String,

    /// Annotation type names carried by this class
    pub annotations: Vec<String>,

    /// Extended/implemented type names
    pub super_types: Vec<String>,

    /// Whether this class is an enum
    pub is_enum: bool,

    /// Whether this class declares an annotation type
    pub is_annotation: bool,

    /// Methods declared by this class
    pub methods: Vec<MethodId>,

    /// Fields declared by this class
    pub fields: Vec<FieldId>,
}

/// A method in the program under optimization
#[derive(Debug, Clone)]
pub struct MethodDef {
    /// Declaring class
    pub class: ClassId,

    /// Simple name (e.g., "onCreate")
    pub name: String,

    /// Descriptor string (e.g., "(Landroid/os/Bundle;)V")
    pub descriptor: String,

    /// Annotation type names carried by this method
    pub annotations: Vec<String>,

    /// Whether this method is implemented natively
    pub is_native: bool,

    /// Instruction body, absent for abstract/native methods
    pub body: Option<MethodBody>,
}

/// A field in the program under optimization
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Declaring class
    pub class: ClassId,

    /// Simple name
    pub name: String,

    /// Dotted type name
    pub type_name: String,

    /// Annotation type names carried by this field
    pub annotations: Vec<String>,
}

/// The full enumerable set of classes, methods and fields of the artifact
///
/// Element identity is stable for the lifetime of one pipeline run and
/// elements are never duplicated. Resolution of a name to an element is an
/// explicit, checked step (`resolve_class`, `find_method`, `find_field`);
/// there is no accessor that silently treats a missing element as "not kept".
#[derive(Debug, Default)]
pub struct Scope {
    classes: Vec<ClassDef>,
    methods: Vec<MethodDef>,
    fields: Vec<FieldDef>,

    /// Map from dotted class name to id
    class_index: HashMap<String, ClassId>,

    /// Entry points declared by the platform manifest (dotted class names)
    entry_points: Vec<String>,
}

impl Scope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class with the given dotted name
    pub fn add_class(&mut self, name: &str) -> ClassId {
        let id = ClassId(self.classes.len());
        self.classes.push(ClassDef {
            name: name.to_string(),
            annotations: Vec::new(),
            super_types: Vec::new(),
            is_enum: false,
            is_annotation: false,
            methods: Vec::new(),
            fields: Vec::new(),
        });
        self.class_index.insert(name.to_string(), id);
        id
    }

    /// Add a method to a class
    pub fn add_method(&mut self, class: ClassId, name: &str, descriptor: &str) -> MethodId {
        let id = MethodId(self.methods.len());
        self.methods.push(MethodDef {
            class,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: Vec::new(),
            is_native: false,
            body: None,
        });
        self.classes[class.0].methods.push(id);
        id
    }

    /// Add a field to a class
    pub fn add_field(&mut self, class: ClassId, name: &str, type_name: &str) -> FieldId {
        let id = FieldId(self.fields.len());
        self.fields.push(FieldDef {
            class,
            name: name.to_string(),
            type_name: type_name.to_string(),
            annotations: Vec::new(),
        });
        self.classes[class.0].fields.push(id);
        id
    }

    /// Declare an entry point supplied by the platform manifest
    pub fn declare_entry_point(&mut self, class_name: &str) {
        self.entry_points.push(class_name.to_string());
    }

    /// Entry points declared so far
    pub fn entry_points(&self) -> &[String] {
        &self.entry_points
    }

    /// Get a class by id
    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.0]
    }

    /// Get a method by id
    pub fn method(&self, id: MethodId) -> &MethodDef {
        &self.methods[id.0]
    }

    /// Get a field by id
    pub fn field(&self, id: FieldId) -> &FieldDef {
        &self.fields[id.0]
    }

    /// Mutable access to a class definition
    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassDef {
        &mut self.classes[id.0]
    }

    /// Mutable access to a method definition
    pub fn method_mut(&mut self, id: MethodId) -> &mut MethodDef {
        &mut self.methods[id.0]
    }

    /// Mutable access to a field definition
    pub fn field_mut(&mut self, id: FieldId) -> &mut FieldDef {
        &mut self.fields[id.0]
    }

    /// Replace a method body (used by passes that shrink code)
    pub fn set_method_body(&mut self, id: MethodId, body: Option<MethodBody>) {
        self.methods[id.0].body = body;
    }

    /// Resolve a dotted class name to an id
    pub fn resolve_class(&self, name: &str) -> Option<ClassId> {
        self.class_index.get(name).copied()
    }

    /// Find the first method with the given name on a class
    pub fn find_method(&self, class: ClassId, name: &str) -> Option<MethodId> {
        self.classes[class.0]
            .methods
            .iter()
            .copied()
            .find(|&m| self.methods[m.0].name == name)
    }

    /// Find all methods with the given name on a class (overloads)
    pub fn find_methods(&self, class: ClassId, name: &str) -> Vec<MethodId> {
        self.classes[class.0]
            .methods
            .iter()
            .copied()
            .filter(|&m| self.methods[m.0].name == name)
            .collect()
    }

    /// Find a field by name on a class
    pub fn find_field(&self, class: ClassId, name: &str) -> Option<FieldId> {
        self.classes[class.0]
            .fields
            .iter()
            .copied()
            .find(|&f| self.fields[f.0].name == name)
    }

    /// Find every method in the scope with the given simple name
    pub fn methods_named(&self, name: &str) -> Vec<MethodId> {
        self.methods
            .iter()
            .enumerate()
            .filter(|(_, m)| m.name == name)
            .map(|(i, _)| MethodId(i))
            .collect()
    }

    /// Iterate over all classes with their ids
    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDef)> {
        self.classes.iter().enumerate().map(|(i, c)| (ClassId(i), c))
    }

    /// Iterate over all methods with their ids
    pub fn methods(&self) -> impl Iterator<Item = (MethodId, &MethodDef)> {
        self.methods.iter().enumerate().map(|(i, m)| (MethodId(i), m))
    }

    /// Iterate over all fields with their ids
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &FieldDef)> {
        self.fields.iter().enumerate().map(|(i, f)| (FieldId(i), f))
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Annotation types known to the scope
    ///
    /// A type is registered if the scope declares it as an annotation class
    /// or if any element carries it. Rules referencing types outside this
    /// set match nothing.
    pub fn annotation_registry(&self) -> HashSet<&str> {
        let mut registry = HashSet::new();

        for class in &self.classes {
            if class.is_annotation {
                registry.insert(class.name.as_str());
            }
            for anno in &class.annotations {
                registry.insert(anno.as_str());
            }
        }
        for method in &self.methods {
            for anno in &method.annotations {
                registry.insert(anno.as_str());
            }
        }
        for field in &self.fields {
            for anno in &field.annotations {
                registry.insert(anno.as_str());
            }
        }

        registry
    }
}
