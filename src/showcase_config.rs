// src/showcase_config.rs
use std::cell::RefCell;
use std::collections::BTreeMap;

pub const RENDER_ATTR: &str = "render";
pub const ANNPATH_ATTR: &str = "annpath";
pub const PMCPATH_ATTR: &str = "pmcpath";
pub const PMCID_ATTR: &str = "pmcid";

/// Anything that stores string attributes the way a DOM element does.
///
/// Setters take `&self` because DOM elements are shared handles; in-memory
/// hosts use interior mutability to match.
pub trait HostAttributes {
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);
}

impl HostAttributes for web_sys::Element {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let _ = web_sys::Element::set_attribute(self, name, value);
    }
}

impl<T: HostAttributes + ?Sized> HostAttributes for &T {
    fn attribute(&self, name: &str) -> Option<String> {
        (**self).attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        (**self).set_attribute(name, value)
    }
}

/// In-memory attribute host, used when no document is around.
#[derive(Debug, Default)]
pub struct AttributeMap {
    values: RefCell<BTreeMap<String, String>>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }
}

impl HostAttributes for AttributeMap {
    fn attribute(&self, name: &str) -> Option<String> {
        self.values.borrow().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }
}

/// Typed accessors over the showcase element's attributes.
///
/// Nothing is cached: every getter reads the host again, so a stage always
/// sees the attribute value current at the moment it builds its widget.
/// Values are never validated.
pub struct ShowcaseConfig<H> {
    host: H,
}

impl<H: HostAttributes> ShowcaseConfig<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn render(&self) -> Option<String> {
        self.host.attribute(RENDER_ATTR)
    }

    pub fn set_render(&self, value: &str) {
        self.host.set_attribute(RENDER_ATTR, value);
    }

    /// Presence of `render`, whatever its value, turns JSON-LD output on.
    pub fn renders_json_ld(&self) -> bool {
        self.render().is_some()
    }

    pub fn annpath(&self) -> Option<String> {
        self.host.attribute(ANNPATH_ATTR)
    }

    pub fn set_annpath(&self, value: &str) {
        self.host.set_attribute(ANNPATH_ATTR, value);
    }

    pub fn pmcpath(&self) -> Option<String> {
        self.host.attribute(PMCPATH_ATTR)
    }

    pub fn set_pmcpath(&self, value: &str) {
        self.host.set_attribute(PMCPATH_ATTR, value);
    }

    pub fn pmcid(&self) -> Option<String> {
        self.host.attribute(PMCID_ATTR)
    }

    pub fn set_pmcid(&self, value: &str) {
        self.host.set_attribute(PMCID_ATTR, value);
    }
}
