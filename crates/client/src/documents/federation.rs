//! Apollo Federation entry points exposed by Hasura.

use serde::{Deserialize, Serialize};

use payroll_graphql_types::federation::{Entity, Representation, Service};

pub struct ServiceSdl;
pub mod service_sdl {
    use super::*;

    pub const OPERATION_NAME: &str = "ServiceSdl";
    pub const QUERY: &str = "query ServiceSdl {
  _service {
    sdl
  }
}
";

    #[derive(Debug, Clone, Default, PartialEq, Serialize)]
    pub struct Variables {}

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        #[serde(rename = "_service")]
        pub service: Service,
    }
}
graphql_operation!(ServiceSdl => service_sdl);

pub struct Entities;
pub mod entities {
    use super::*;

    pub const OPERATION_NAME: &str = "Entities";
    pub const QUERY: &str = "query Entities($representations: [_Any!]!) {
  _entities(representations: $representations) {
    __typename
    ... on users {
      id
      name
      email
      role
    }
    ... on payrolls {
      id
      name
      status
      client_id
    }
    ... on clients {
      id
      name
    }
    ... on notes {
      id
      entity_id
      entity_type
      content
      is_important
    }
  }
}
";

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Variables {
        pub representations: Vec<Representation>,
    }

    /// One entry per representation, `null` where the entity was not found.
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        #[serde(rename = "_entities")]
        pub entities: Vec<Option<Entity>>,
    }
}
graphql_operation!(Entities => entities);
