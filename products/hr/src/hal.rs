//! Hypermedia shaping for employee resources.
//!
//! Output follows the HAL conventions: a resource carries a `_links` object
//! keyed by relation, a collection wraps its items in `_embedded`. Link
//! attachment is kept behind [`Assembler`] so a deployment can serve plain
//! JSON by swapping in [`PlainAssembler`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use url::form_urlencoded;

use crate::dto::EmployeeDto;

pub const REL_SELF: &str = "self";
pub const REL_EMPLOYEES: &str = "employees";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<String, Link>);

impl Links {
    pub fn with(mut self, rel: &str, href: impl Into<String>) -> Self {
        self.0.insert(rel.to_string(), Link { href: href.into() });
        self
    }

    pub fn get(&self, rel: &str) -> Option<&Link> {
        self.0.get(rel)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single resource with its links.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityModel<T> {
    #[serde(flatten)]
    pub content: T,
    #[serde(rename = "_links", skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

impl<T> EntityModel<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            links: Links::default(),
        }
    }

    pub fn link(mut self, rel: &str, href: impl Into<String>) -> Self {
        self.links = self.links.with(rel, href);
        self
    }
}

/// A list of resources embedded under one relation name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionModel<T> {
    pub rel: &'static str,
    pub items: Vec<EntityModel<T>>,
    pub links: Links,
}

impl<T> CollectionModel<T> {
    pub fn new(rel: &'static str, items: Vec<EntityModel<T>>) -> Self {
        Self {
            rel,
            items,
            links: Links::default(),
        }
    }

    pub fn link(mut self, rel: &str, href: impl Into<String>) -> Self {
        self.links = self.links.with(rel, href);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

struct Embedded<'a, T> {
    rel: &'static str,
    items: &'a [EntityModel<T>],
}

impl<T: Serialize> Serialize for Embedded<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.rel, self.items)?;
        map.end()
    }
}

// `_embedded` is written even when the list is empty.
impl<T: Serialize> Serialize for CollectionModel<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.links.is_empty() { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(
            "_embedded",
            &Embedded {
                rel: self.rel,
                items: &self.items,
            },
        )?;
        if !self.links.is_empty() {
            map.serialize_entry("_links", &self.links)?;
        }
        map.end()
    }
}

/// Href factory for employee resources.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Routes {
    base_url: String,
}

impl Routes {
    /// `base_url` is prepended to every href; empty yields root-relative hrefs.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn employees(&self) -> String {
        format!("{}/employees", self.base_url)
    }

    pub fn employee(&self, id: i64) -> String {
        format!("{}/employees/{id}", self.base_url)
    }

    pub fn search_by_name(&self, prefix: &str) -> String {
        format!(
            "{}/employees/search/by-name?prefix={}",
            self.base_url,
            encode(prefix)
        )
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Turns employee DTOs into response representations.
pub trait Assembler: Send + Sync {
    fn to_model(&self, routes: &Routes, dto: EmployeeDto) -> EntityModel<EmployeeDto>;

    fn to_collection(
        &self,
        items: Vec<EntityModel<EmployeeDto>>,
        self_href: String,
    ) -> CollectionModel<EmployeeDto>;
}

/// Attaches `self` and `employees` links to every resource.
#[derive(Clone, Copy, Debug, Default)]
pub struct HalAssembler;

impl Assembler for HalAssembler {
    fn to_model(&self, routes: &Routes, dto: EmployeeDto) -> EntityModel<EmployeeDto> {
        let model = EntityModel::new(dto);
        let model = match model.content.id {
            Some(id) => model.link(REL_SELF, routes.employee(id)),
            None => model,
        };
        model.link(REL_EMPLOYEES, routes.employees())
    }

    fn to_collection(
        &self,
        items: Vec<EntityModel<EmployeeDto>>,
        self_href: String,
    ) -> CollectionModel<EmployeeDto> {
        CollectionModel::new(REL_EMPLOYEES, items).link(REL_SELF, self_href)
    }
}

/// Emits bare resources without any links.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainAssembler;

impl Assembler for PlainAssembler {
    fn to_model(&self, _routes: &Routes, dto: EmployeeDto) -> EntityModel<EmployeeDto> {
        EntityModel::new(dto)
    }

    fn to_collection(
        &self,
        items: Vec<EntityModel<EmployeeDto>>,
        _self_href: String,
    ) -> CollectionModel<EmployeeDto> {
        CollectionModel::new(REL_EMPLOYEES, items)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ann() -> EmployeeDto {
        EmployeeDto {
            id: Some(1),
            name: "Ann".into(),
            email: "ann@x.com".into(),
            role: None,
        }
    }

    #[test]
    fn routes_trim_trailing_slash() {
        let routes = Routes::new("https://hr.example.com/");
        assert_eq!(routes.employee(3), "https://hr.example.com/employees/3");
        assert_eq!(Routes::default().employees(), "/employees");
    }

    #[test]
    fn search_href_is_query_encoded() {
        assert_eq!(
            Routes::default().search_by_name("jo an&"),
            "/employees/search/by-name?prefix=jo+an%26"
        );
    }

    #[test]
    fn hal_model_carries_self_and_collection_links() {
        let model = HalAssembler.to_model(&Routes::default(), ann());
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "name": "Ann",
                "email": "ann@x.com",
                "role": null,
                "_links": {
                    "employees": {"href": "/employees"},
                    "self": {"href": "/employees/1"}
                }
            })
        );
    }

    #[test]
    fn empty_collection_is_well_formed() {
        let routes = Routes::default();
        let collection = HalAssembler.to_collection(Vec::new(), routes.employees());
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(
            value,
            json!({
                "_embedded": {"employees": []},
                "_links": {"self": {"href": "/employees"}}
            })
        );
    }

    #[test]
    fn plain_assembler_omits_links() {
        let routes = Routes::default();
        let item = PlainAssembler.to_model(&routes, ann());
        let collection = PlainAssembler.to_collection(vec![item], routes.employees());
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["_embedded"]["employees"][0]["name"], "Ann");
        assert!(value["_embedded"]["employees"][0].get("_links").is_none());
        assert!(value.get("_links").is_none());
    }
}
