use ec_api::models::ClusterMetadataInfo;

/// The public URLs of a resource, derived from its cluster metadata.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Endpoints {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl Endpoints {
    pub fn from_metadata(metadata: Option<&ClusterMetadataInfo>) -> Self {
        let Some(metadata) = metadata else {
            return Self::default();
        };
        let (Some(endpoint), Some(ports)) = (&metadata.endpoint, &metadata.ports) else {
            return Self::default();
        };

        Self {
            http: ports.http.map(|port| format!("http://{endpoint}:{port}")),
            https: ports.https.map(|port| format!("https://{endpoint}:{port}")),
        }
    }
}

/// Returns the URL the metadata lists for `service`, e.g. `fleet`.
pub fn service_url(metadata: Option<&ClusterMetadataInfo>, service: &str) -> Option<String> {
    metadata?
        .services_urls
        .iter()
        .find(|url| url.service.as_deref() == Some(service))
        .and_then(|url| url.url.clone())
}

#[cfg(test)]
mod tests {
    use ec_api::models::{ClusterMetadataPortInfo, ServiceUrl};

    use super::*;

    #[test]
    fn endpoints_need_host_and_port() {
        let mut metadata = ClusterMetadataInfo {
            endpoint: Some("abc.example.com".to_owned()),
            ports: Some(ClusterMetadataPortInfo {
                http: Some(9200),
                https: Some(443),
            }),
            ..Default::default()
        };

        assert_eq!(
            Endpoints::from_metadata(Some(&metadata)),
            Endpoints {
                http: Some("http://abc.example.com:9200".to_owned()),
                https: Some("https://abc.example.com:443".to_owned()),
            }
        );

        metadata.endpoint = None;
        assert_eq!(Endpoints::from_metadata(Some(&metadata)), Endpoints::default());
        assert_eq!(Endpoints::from_metadata(None), Endpoints::default());
    }

    #[test]
    fn service_url_by_name() {
        let metadata = ClusterMetadataInfo {
            services_urls: vec![ServiceUrl {
                service: Some("fleet".to_owned()),
                url: Some("https://fleet.example.com".to_owned()),
            }],
            ..Default::default()
        };

        assert_eq!(
            service_url(Some(&metadata), "fleet").as_deref(),
            Some("https://fleet.example.com")
        );
        assert_eq!(service_url(Some(&metadata), "apm"), None);
    }
}
