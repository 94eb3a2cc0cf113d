/// Builds a [`Value`](crate::Value) from JSON-like syntax.
///
/// Object keys are string literals; any other Rust expression goes through
/// [`to_value`](crate::to_value) and becomes `null` if it cannot be represented.
///
/// ```rust
/// use jsonbind::json;
///
/// let port = 8080;
/// let value = json!({ "host": "localhost", "port": port, "tags": ["a", "b"] });
/// assert_eq!(value.to_string(), r#"{"host":"localhost","port":8080,"tags":["a","b"]}"#);
/// ```
#[macro_export]
macro_rules! json {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(::std::vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(::std::vec![$($crate::json!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::Map::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::Map::new();
        $(
            object.insert(::std::string::ToString::to_string(&$key), $crate::json!($value));
        )*
        $crate::Value::Object(object)
    }};

    ($other:expr) => {
        $crate::to_value(&$other).unwrap_or($crate::Value::Null)
    };
}

/// Implements [`Record`](crate::Record) and [`Bind`](crate::Bind) for a struct.
///
/// List the fields to bind, optionally with `=> "key"` to change the wire key.
/// The struct must implement `Default`; fields not listed are left at their
/// default when unmarshalling and omitted when marshalling.
///
/// ```rust
/// use jsonbind::{record, Registry};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Limits {
///     max_conns: u32,
///     timeout_ms: u64,
/// }
///
/// record!(Limits { max_conns => "maxConnections", timeout_ms });
///
/// let registry = Registry::new();
/// let limits: Limits = registry.unmarshal_str(r#"{"maxConnections": 64}"#).unwrap();
/// assert_eq!(limits, Limits { max_conns: 64, timeout_ms: 0 });
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $($field:ident $(=> $key:literal)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn fields() -> ::std::vec::Vec<$crate::Field<Self>> {
                ::std::vec![$(
                    $crate::Field::<$ty>::new(
                        ::std::stringify!($field),
                        |record| &record.$field,
                        |record| &mut record.$field,
                    )$(.tag($key))?
                ),*]
            }
        }

        impl $crate::Bind for $ty {
            fn marshaller(
                _: &$crate::Registry,
            ) -> $crate::Result<$crate::Marshaller<Self>> {
                ::std::result::Result::Ok($crate::record::record_marshaller::<Self>())
            }

            fn unmarshaller(
                _: &$crate::Registry,
            ) -> $crate::Result<$crate::Unmarshaller<Self>> {
                ::std::result::Result::Ok($crate::record::record_unmarshaller::<Self>())
            }
        }
    };
}
