use super::UriTemplate;
use serde::{
    de::{Error, Unexpected},
    Deserialize, Serialize,
};

impl<'a> Deserialize<'a> for UriTemplate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let source = String::deserialize(deserializer)?;
        Self::new(source.as_str())
            .map_err(|_| D::Error::invalid_value(Unexpected::Str(&source), &"valid URI template"))
    }
}

impl Serialize for UriTemplate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct MyTable {
        template: Option<UriTemplate>,
    }

    #[derive(Serialize, Deserialize)]
    struct MyUncheckedTable {
        template: Option<String>,
    }

    #[test]
    fn valid_template() {
        let data = MyUncheckedTable {
            template: Some("http://example.org/{id:[0-9]+}".into()),
        };
        let toml_str = toml::to_string(&data).unwrap();
        let data2 = toml::from_str::<MyTable>(&toml_str).unwrap();
        let template = data2.template.unwrap();
        assert_eq!(data.template.unwrap(), template.as_str());
        assert!(template.matches("http://example.org/42"));
    }

    #[test]
    fn invalid_template() {
        let data = MyUncheckedTable {
            template: Some("http://example.org/{id:}".into()),
        };
        let toml_str = toml::to_string(&data).unwrap();
        let data2 = toml::from_str::<MyTable>(&toml_str);
        assert!(data2.is_err());
    }

    #[test]
    fn serialize() {
        let data = MyTable {
            template: Some(UriTemplate::new("/hotels/{hotel}").unwrap()),
        };
        let toml_str = toml::to_string(&data).unwrap();
        assert_eq!(toml_str.trim(), r#"template = "/hotels/{hotel}""#);
    }
}
