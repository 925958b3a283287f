use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::property::BindingProperty;
use crate::resolver::RequestPropertyResolverBase;
use crate::types::TypeInfo;

/// 解析计划中的一个条目：属性路径、绑定属性、选中的解析器
pub struct ResolvedPropertyData<R: ?Sized> {
    property_name: String,
    binding_property: Arc<BindingProperty>,
    resolver: Arc<R>,
}

impl<R: ?Sized> ResolvedPropertyData<R> {
    pub fn new(property_name: impl Into<String>, binding_property: BindingProperty, resolver: Arc<R>) -> Self {
        Self {
            property_name: property_name.into(),
            binding_property: Arc::new(binding_property),
            resolver,
        }
    }

    /// 点分隔的属性路径
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn binding_property(&self) -> &BindingProperty {
        &self.binding_property
    }

    pub fn resolver(&self) -> &Arc<R> {
        &self.resolver
    }
}

impl<R: ?Sized> Clone for ResolvedPropertyData<R> {
    fn clone(&self) -> Self {
        Self {
            property_name: self.property_name.clone(),
            binding_property: Arc::clone(&self.binding_property),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R: ?Sized> PartialEq for ResolvedPropertyData<R> {
    fn eq(&self, other: &Self) -> bool {
        self.property_name == other.property_name
            && self.binding_property == other.binding_property
            && std::ptr::addr_eq(Arc::as_ptr(&self.resolver), Arc::as_ptr(&other.resolver))
    }
}

impl<R: ?Sized + RequestPropertyResolverBase> fmt::Debug for ResolvedPropertyData<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedPropertyData")
            .field("property_name", &self.property_name)
            .field("type", &self.binding_property.get_type().name())
            .field("resolver", &self.resolver.name())
            .finish()
    }
}

/// 解析计划：属性路径到条目的有序映射
pub struct ResolutionPlan<R: ?Sized> {
    target: TypeInfo,
    entries: Vec<ResolvedPropertyData<R>>,
    index: HashMap<String, usize>,
}

impl<R: ?Sized> ResolutionPlan<R> {
    pub fn new(target: TypeInfo, entries: Vec<ResolvedPropertyData<R>>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.property_name.clone(), i))
            .collect();
        Self { target, entries, index }
    }

    pub fn target_type(&self) -> &TypeInfo {
        &self.target
    }

    pub fn get(&self, property_name: &str) -> Option<&ResolvedPropertyData<R>> {
        self.index.get(property_name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, property_name: &str) -> bool {
        self.index.contains_key(property_name)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.property_name())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedPropertyData<R>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a, R: ?Sized> IntoIterator for &'a ResolutionPlan<R> {
    type Item = &'a ResolvedPropertyData<R>;
    type IntoIter = std::slice::Iter<'a, ResolvedPropertyData<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<R: ?Sized + RequestPropertyResolverBase> fmt::Debug for ResolutionPlan<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionPlan")
            .field("target", &self.target.name())
            .field("entries", &self.entries)
            .finish()
    }
}
