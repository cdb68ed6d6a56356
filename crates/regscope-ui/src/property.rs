//! # Register Properties
//!
//! Read-only property nodes for register views.
//!
//! A group is an expandable node whose children are its registers. Each
//! child reports its name, its value (or [`VALUE_PLACEHOLDER`] when the
//! backend did not report one) and a read-only attribute.
//!
//! The nodes only translate a [`Snapshot`] into display records. They never
//! classify and never talk to the backend. Every mutation or navigation a
//! property-based view might ask for is answered with
//! [`RegscopeError::NotSupported`].
//!
//! ## Example
//!
//! ```rust
//! use regscope_core::detect::FirstNameDetector;
//! use regscope_core::schema::Schema;
//! use regscope_core::types::ThreadId;
//! use regscope_ui::property::{Attributes, DebugProperty, GroupProperty, InfoFields};
//!
//! let names = vec!["eax".to_string(), "ebx".to_string()];
//! let schema = Schema::build(&names, &FirstNameDetector);
//! let snapshot = schema.assemble(ThreadId(1), vec![Some("0x1".to_string()), None]);
//!
//! let group = GroupProperty::new(snapshot.groups()[0].clone());
//! let info = group.info(InfoFields::NAME | InfoFields::ATTRIB);
//! assert_eq!(info.name.as_deref(), Some("CPU"));
//! assert!(info.attributes.unwrap().contains(Attributes::EXPANDABLE));
//!
//! let children = group.children(InfoFields::NAME | InfoFields::VALUE).unwrap();
//! assert_eq!(children[1].value.as_deref(), Some("??"));
//! ```
//!
//! [`Snapshot`]: regscope_core::snapshot::Snapshot

use std::time::Duration;

use bitflags::bitflags;
use regscope_core::error::{RegscopeError, RegscopeResult};
use regscope_core::snapshot::GroupSnapshot;
use regscope_core::types::Register;

/// Shown in place of a value the backend did not report.
pub const VALUE_PLACEHOLDER: &str = "??";

bitflags! {
    /// Which parts of a [`PropertyInfo`] the caller wants filled in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InfoFields: u32 {
        /// Display name
        const NAME = 1 << 0;
        /// Value text
        const VALUE = 1 << 1;
        /// Attribute flags
        const ATTRIB = 1 << 2;
        /// The property node itself
        const PROP = 1 << 3;
    }
}

bitflags! {
    /// Attributes a view uses to decide how to present a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attributes: u32 {
        /// The value cannot be edited
        const VALUE_READONLY = 1 << 0;
        /// The node has children
        const EXPANDABLE = 1 << 1;
    }
}

/// A display record. Only the requested fields are `Some`.
#[derive(Debug, Clone, Default)]
pub struct PropertyInfo
{
    /// Display name, with [`InfoFields::NAME`]
    pub name: Option<String>,
    /// Value text, with [`InfoFields::VALUE`]
    pub value: Option<String>,
    /// Attributes, with [`InfoFields::ATTRIB`]
    pub attributes: Option<Attributes>,
    /// The node, with [`InfoFields::PROP`]
    pub property: Option<PropertyNode>,
}

impl PropertyInfo
{
    /// The fields that are actually filled in.
    #[must_use]
    pub fn fields(&self) -> InfoFields
    {
        let mut fields = InfoFields::empty();
        fields.set(InfoFields::NAME, self.name.is_some());
        fields.set(InfoFields::VALUE, self.value.is_some());
        fields.set(InfoFields::ATTRIB, self.attributes.is_some());
        fields.set(InfoFields::PROP, self.property.is_some());
        fields
    }
}

/// Either kind of register property node.
#[derive(Debug, Clone)]
pub enum PropertyNode
{
    /// A register group
    Group(GroupProperty),
    /// A single register
    Register(RegisterProperty),
}

/// Operations a property-based view may invoke on a node.
///
/// Only [`info`](DebugProperty::info) is required. The remaining operations
/// default to [`RegscopeError::NotSupported`], which is the correct answer
/// for the read-only register nodes.
#[allow(unused_variables)]
pub trait DebugProperty
{
    /// Describe this node, filling in the requested `fields`.
    fn info(&self, fields: InfoFields) -> PropertyInfo;

    /// Describe the children of this node.
    ///
    /// ## Errors
    ///
    /// `NotSupported` for leaf nodes.
    fn children(&self, fields: InfoFields) -> RegscopeResult<Vec<PropertyInfo>>
    {
        Err(RegscopeError::NotSupported("enumerate children"))
    }

    /// Parse `value` and store it.
    ///
    /// ## Errors
    ///
    /// `NotSupported` unless the node is writable.
    fn set_value_as_string(&mut self, value: &str, radix: u32, timeout: Duration) -> RegscopeResult<()>
    {
        Err(RegscopeError::NotSupported("set value"))
    }

    /// Store the value of another node.
    ///
    /// ## Errors
    ///
    /// `NotSupported` unless the node is writable.
    fn set_value_as_reference(&mut self, value: &PropertyNode, timeout: Duration) -> RegscopeResult<()>
    {
        Err(RegscopeError::NotSupported("set value by reference"))
    }

    /// Address of the memory the node's value lives in.
    ///
    /// ## Errors
    ///
    /// `NotSupported` unless the node is backed by memory.
    fn memory_context(&self) -> RegscopeResult<u64>
    {
        Err(RegscopeError::NotSupported("memory context"))
    }

    /// Raw bytes of the node's value.
    ///
    /// ## Errors
    ///
    /// `NotSupported` unless the node is backed by memory.
    fn memory_bytes(&self) -> RegscopeResult<Vec<u8>>
    {
        Err(RegscopeError::NotSupported("memory bytes"))
    }

    /// A reference to the node's value.
    ///
    /// ## Errors
    ///
    /// `NotSupported` unless the node supports references.
    fn reference(&self) -> RegscopeResult<PropertyNode>
    {
        Err(RegscopeError::NotSupported("reference"))
    }

    /// Size of the value in bytes.
    ///
    /// ## Errors
    ///
    /// `NotSupported` unless the size is known.
    fn size(&self) -> RegscopeResult<usize>
    {
        Err(RegscopeError::NotSupported("size"))
    }

    /// The node this one was expanded from.
    ///
    /// ## Errors
    ///
    /// `NotSupported` unless the node tracks its parent.
    fn parent(&self) -> RegscopeResult<PropertyNode>
    {
        Err(RegscopeError::NotSupported("parent"))
    }

    /// The most derived view of the value.
    ///
    /// ## Errors
    ///
    /// `NotSupported` unless the node has a dynamic type.
    fn derived_most(&self) -> RegscopeResult<PropertyNode>
    {
        Err(RegscopeError::NotSupported("derived-most property"))
    }

    /// Extra information identified by `key`.
    ///
    /// ## Errors
    ///
    /// `NotSupported` unless the node carries that information.
    fn extended_info(&self, key: &str) -> RegscopeResult<String>
    {
        Err(RegscopeError::NotSupported("extended info"))
    }
}

/// An expandable, read-only node for one register group.
#[derive(Debug, Clone)]
pub struct GroupProperty
{
    group: GroupSnapshot,
}

impl GroupProperty
{
    /// Node over one group of a snapshot.
    #[must_use]
    pub fn new(group: GroupSnapshot) -> Self
    {
        Self { group }
    }

    /// The group's snapshot.
    #[must_use]
    pub fn group(&self) -> &GroupSnapshot
    {
        &self.group
    }
}

impl DebugProperty for GroupProperty
{
    fn info(&self, fields: InfoFields) -> PropertyInfo
    {
        let mut info = PropertyInfo::default();
        if fields.contains(InfoFields::NAME) {
            info.name = Some(self.group.name().to_string());
        }
        if fields.contains(InfoFields::ATTRIB) {
            info.attributes = Some(Attributes::VALUE_READONLY | Attributes::EXPANDABLE);
        }
        if fields.contains(InfoFields::PROP) {
            info.property = Some(PropertyNode::Group(self.clone()));
        }
        info
    }

    fn children(&self, fields: InfoFields) -> RegscopeResult<Vec<PropertyInfo>>
    {
        let children: Vec<PropertyInfo> = self
            .group
            .registers()
            .iter()
            .map(|register| RegisterProperty::new(register.clone()).info(fields))
            .collect();
        debug_assert_eq!(
            children.len(),
            self.group.group().count(),
            "group '{}' lost registers between schema and snapshot",
            self.group.name()
        );
        Ok(children)
    }
}

/// A read-only leaf node for one register.
#[derive(Debug, Clone)]
pub struct RegisterProperty
{
    register: Register,
}

impl RegisterProperty
{
    /// Node over one register value.
    #[must_use]
    pub fn new(register: Register) -> Self
    {
        Self { register }
    }

    /// The register.
    #[must_use]
    pub fn register(&self) -> &Register
    {
        &self.register
    }
}

impl DebugProperty for RegisterProperty
{
    fn info(&self, fields: InfoFields) -> PropertyInfo
    {
        let mut info = PropertyInfo::default();
        if fields.contains(InfoFields::NAME) {
            info.name = Some(self.register.name().to_string());
        }
        if fields.contains(InfoFields::VALUE) {
            info.value = Some(self.register.content_or(VALUE_PLACEHOLDER).to_string());
        }
        if fields.contains(InfoFields::ATTRIB) {
            info.attributes = Some(Attributes::VALUE_READONLY);
        }
        if fields.contains(InfoFields::PROP) {
            info.property = Some(PropertyNode::Register(self.clone()));
        }
        info
    }
}
