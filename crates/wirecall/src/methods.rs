use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::error::RpcError;
use crate::request::RequestParams;

/// Outcome of one method invocation.
pub type MethodResult = Result<Value, RpcError>;

/// A callable the dispatcher can invoke.
///
/// Array params arrive positionally, object params by name, an absent
/// `params` member arrives as `None`. Failures travel back as [`RpcError`];
/// arbitrary errors can be forwarded through the `From` impl for boxed
/// errors or wrapped with [`RpcError::application`].
pub trait Method: Send + Sync {
    fn call(&self, params: Option<RequestParams>) -> MethodResult;
}

/// Plain functions and closures are methods as-is.
impl<F> Method for F
where
    F: Fn(Option<RequestParams>) -> MethodResult + Send + Sync,
{
    fn call(&self, params: Option<RequestParams>) -> MethodResult {
        self(params)
    }
}

/// Name-to-callable lookup consulted during dispatch.
///
/// The registry is read-only for the whole of a dispatch cycle; anything
/// that can resolve a name to a [`Method`] qualifies.
pub trait MethodRegistry {
    fn lookup(&self, name: &str) -> Option<&dyn Method>;
}

/// The registry you get out of the box.
#[derive(Default)]
pub struct Methods {
    items: HashMap<String, Box<dyn Method>>,
}

impl Methods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method under a name, replacing any previous entry.
    pub fn insert<M>(&mut self, name: impl Into<String>, method: M) -> &mut Self
    where
        M: Method + 'static,
    {
        self.items.insert(name.into(), Box::new(method));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<(String, Box<dyn Method>)> for Methods {
    fn from_iter<I: IntoIterator<Item = (String, Box<dyn Method>)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl MethodRegistry for Methods {
    fn lookup(&self, name: &str) -> Option<&dyn Method> {
        self.items.get(name).map(Box::as_ref)
    }
}

impl MethodRegistry for HashMap<String, Box<dyn Method>> {
    fn lookup(&self, name: &str) -> Option<&dyn Method> {
        self.get(name).map(Box::as_ref)
    }
}

impl fmt::Debug for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Methods")
            .field("names", &self.items.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_closure_registration() {
        let mut methods = Methods::new();
        methods.insert("ping", |_params: Option<RequestParams>| Ok(json!("pong")));

        let found = methods.lookup("ping").unwrap();
        assert_eq!(found.call(None).unwrap(), json!("pong"));
        assert!(methods.lookup("pong").is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut methods = Methods::new();
        methods.insert("v", |_: Option<RequestParams>| Ok(json!(1)));
        methods.insert("v", |_: Option<RequestParams>| Ok(json!(2)));
        assert_eq!(methods.len(), 1);
        assert_eq!(methods.lookup("v").unwrap().call(None).unwrap(), json!(2));
    }

    #[test]
    fn test_struct_method() {
        struct Echo;

        impl Method for Echo {
            fn call(&self, params: Option<RequestParams>) -> MethodResult {
                Ok(params.map(|p| p.to_value()).unwrap_or(Value::Null))
            }
        }

        let mut methods = Methods::new();
        methods.insert("echo", Echo);
        let result = methods
            .lookup("echo")
            .unwrap()
            .call(Some(RequestParams::Array(vec![json!(1)])))
            .unwrap();
        assert_eq!(result, json!([1]));
    }

    #[test]
    fn test_collect_from_pairs() {
        let methods: Methods = [
            (
                "one".to_string(),
                Box::new(|_: Option<RequestParams>| Ok(json!(1))) as Box<dyn Method>,
            ),
            (
                "two".to_string(),
                Box::new(|_: Option<RequestParams>| Ok(json!(2))) as Box<dyn Method>,
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods.lookup("two").unwrap().call(None).unwrap(), json!(2));
    }

    #[test]
    fn test_hash_map_registry() {
        let mut map: HashMap<String, Box<dyn Method>> = HashMap::new();
        map.insert(
            "one".to_string(),
            Box::new(|_: Option<RequestParams>| Ok(json!(1))),
        );
        assert!(map.lookup("one").is_some());
        assert!(map.lookup("two").is_none());
    }
}
