//! Typed wrappers for the ARE REST resources
//!
//! Each wrapper builds one [`RestRequest`] and dispatches it. Variable path
//! segments are path-encoded. A wrapper whose required parameter or body is
//! empty returns `Error::Core(MissingParameter)` and sends nothing.

use crate::dispatcher::{
    RequestDispatcher, RestRequest, RestResponse, WriteMethod, MIME_JSON, MIME_TEXT, MIME_XML,
};
use crate::error::Result;
use are_rest_core::encoding::encode;
use are_rest_core::{Error as CoreError, PortDatatype};

fn require<'a>(value: &'a str, name: &'static str) -> Result<&'a str> {
    if value.is_empty() {
        tracing::debug!(parameter = name, "Required parameter is empty, request not sent");
        return Err(CoreError::MissingParameter(name).into());
    }
    Ok(value)
}

/// Encoded path segment for a required parameter
fn segment(value: &str, name: &'static str) -> Result<String> {
    require(value, name).map(encode)
}

impl RequestDispatcher {
    async fn call(&self, request: RestRequest) -> Result<RestResponse> {
        Ok(self.dispatch(request).await?)
    }

    // Runtime model

    pub async fn download_deployed_model(&self) -> Result<RestResponse> {
        self.call(RestRequest::get("runtime/model").accept(MIME_XML))
            .await
    }

    pub async fn upload_model(&self, model_xml: &str, method: WriteMethod) -> Result<RestResponse> {
        let model_xml = require(model_xml, "model_xml")?;
        self.call(RestRequest::new(method, "runtime/model").body(model_xml, MIME_XML))
            .await
    }

    /// Deploy and start the model stored at `filepath`
    pub async fn autorun(&self, filepath: &str, method: WriteMethod) -> Result<RestResponse> {
        let filepath = segment(filepath, "filepath")?;
        self.call(RestRequest::new(
            method,
            format!("runtime/model/autorun/{}", filepath),
        ))
        .await
    }

    pub async fn pause_model(&self, method: WriteMethod) -> Result<RestResponse> {
        self.call(RestRequest::new(method, "runtime/model/state/pause"))
            .await
    }

    pub async fn start_model(&self, method: WriteMethod) -> Result<RestResponse> {
        self.call(RestRequest::new(method, "runtime/model/state/start"))
            .await
    }

    pub async fn stop_model(&self, method: WriteMethod) -> Result<RestResponse> {
        self.call(RestRequest::new(method, "runtime/model/state/stop"))
            .await
    }

    /// Current model state, as the server's opaque text
    pub async fn get_model_state(&self) -> Result<RestResponse> {
        self.call(RestRequest::get("runtime/model/state").accept(MIME_TEXT))
            .await
    }

    pub async fn get_model_name(&self) -> Result<RestResponse> {
        self.call(RestRequest::get("runtime/model/name").accept(MIME_TEXT))
            .await
    }

    pub async fn deploy_model_from_file(
        &self,
        filepath: &str,
        method: WriteMethod,
    ) -> Result<RestResponse> {
        let filepath = segment(filepath, "filepath")?;
        self.call(RestRequest::new(method, format!("runtime/model/{}", filepath)))
            .await
    }

    // Runtime components

    pub async fn get_runtime_component_ids(&self) -> Result<RestResponse> {
        self.call(RestRequest::get("runtime/model/components/ids").accept(MIME_JSON))
            .await
    }

    pub async fn get_runtime_component_property_keys(
        &self,
        component_id: &str,
    ) -> Result<RestResponse> {
        let component_id = segment(component_id, "component_id")?;
        self.call(
            RestRequest::get(format!("runtime/model/components/{}", component_id))
                .accept(MIME_JSON),
        )
        .await
    }

    pub async fn get_runtime_component_property(
        &self,
        component_id: &str,
        key: &str,
    ) -> Result<RestResponse> {
        let component_id = segment(component_id, "component_id")?;
        let key = segment(key, "key")?;
        self.call(
            RestRequest::get(format!("runtime/model/components/{}/{}", component_id, key))
                .accept(MIME_TEXT),
        )
        .await
    }

    pub async fn get_runtime_component_property_dynamic(
        &self,
        component_id: &str,
        key: &str,
    ) -> Result<RestResponse> {
        let component_id = segment(component_id, "component_id")?;
        let key = segment(key, "key")?;
        self.call(
            RestRequest::get(format!(
                "runtime/model/components/{}/{}/dynamicproperty",
                component_id, key
            ))
            .accept(MIME_JSON),
        )
        .await
    }

    /// Set several properties at once from a JSON property map
    pub async fn set_runtime_component_properties(
        &self,
        property_map_json: &str,
        method: WriteMethod,
    ) -> Result<RestResponse> {
        let property_map_json = require(property_map_json, "property_map")?;
        self.call(
            RestRequest::new(method, "runtime/model/components/properties")
                .body(property_map_json, MIME_JSON),
        )
        .await
    }

    pub async fn set_runtime_component_property(
        &self,
        component_id: &str,
        key: &str,
        value: &str,
    ) -> Result<RestResponse> {
        let component_id = segment(component_id, "component_id")?;
        let key = segment(key, "key")?;
        let value = require(value, "value")?;
        self.call(
            RestRequest::new(
                WriteMethod::Put,
                format!("runtime/model/components/{}/{}", component_id, key),
            )
            .body(value, MIME_TEXT),
        )
        .await
    }

    // Channels

    pub async fn get_event_channels_ids(&self) -> Result<RestResponse> {
        self.call(RestRequest::get("runtime/model/channels/event/ids").accept(MIME_JSON))
            .await
    }

    pub async fn get_event_channel_source(&self, channel_id: &str) -> Result<RestResponse> {
        self.channel_endpoint("event", channel_id, "source").await
    }

    pub async fn get_event_channel_target(&self, channel_id: &str) -> Result<RestResponse> {
        self.channel_endpoint("event", channel_id, "target").await
    }

    pub async fn get_data_channels_ids(&self) -> Result<RestResponse> {
        self.call(RestRequest::get("runtime/model/channels/data/ids").accept(MIME_JSON))
            .await
    }

    pub async fn get_data_channel_source(&self, channel_id: &str) -> Result<RestResponse> {
        self.channel_endpoint("data", channel_id, "source").await
    }

    pub async fn get_data_channel_target(&self, channel_id: &str) -> Result<RestResponse> {
        self.channel_endpoint("data", channel_id, "target").await
    }

    async fn channel_endpoint(
        &self,
        kind: &str,
        channel_id: &str,
        end: &str,
    ) -> Result<RestResponse> {
        let channel_id = segment(channel_id, "channel_id")?;
        self.call(
            RestRequest::get(format!(
                "runtime/model/channels/{}/{}/{}",
                kind, channel_id, end
            ))
            .accept(MIME_JSON),
        )
        .await
    }

    pub async fn get_component_event_channels_ids(
        &self,
        component_id: &str,
    ) -> Result<RestResponse> {
        self.component_ids(component_id, "channels/event/ids").await
    }

    pub async fn get_component_data_channels_ids(
        &self,
        component_id: &str,
    ) -> Result<RestResponse> {
        self.component_ids(component_id, "channels/data/ids").await
    }

    // Ports and events

    pub async fn get_component_input_port_ids(&self, component_id: &str) -> Result<RestResponse> {
        self.component_ids(component_id, "ports/input/ids").await
    }

    pub async fn get_component_output_port_ids(&self, component_id: &str) -> Result<RestResponse> {
        self.component_ids(component_id, "ports/output/ids").await
    }

    async fn component_ids(&self, component_id: &str, suffix: &str) -> Result<RestResponse> {
        let component_id = segment(component_id, "component_id")?;
        self.call(
            RestRequest::get(format!("runtime/model/components/{}/{}", component_id, suffix))
                .accept(MIME_JSON),
        )
        .await
    }

    pub async fn get_port_datatype(&self, component_id: &str, port_id: &str) -> Result<RestResponse> {
        let component_id = segment(component_id, "component_id")?;
        let port_id = segment(port_id, "port_id")?;
        self.call(
            RestRequest::get(format!(
                "runtime/model/components/{}/ports/{}/datatype",
                component_id, port_id
            ))
            .accept(MIME_TEXT),
        )
        .await
    }

    /// [`get_port_datatype`](Self::get_port_datatype) parsed into a [`PortDatatype`]
    pub async fn port_datatype(&self, component_id: &str, port_id: &str) -> Result<PortDatatype> {
        let response = self.get_port_datatype(component_id, port_id).await?;
        Ok(PortDatatype::from_wire(&response.body))
    }

    pub async fn send_data_to_input_port(
        &self,
        component_id: &str,
        port_id: &str,
        value: &str,
        method: WriteMethod,
    ) -> Result<RestResponse> {
        let component_id = segment(component_id, "component_id")?;
        let port_id = segment(port_id, "port_id")?;
        let value = require(value, "value")?;
        self.call(
            RestRequest::new(
                method,
                format!(
                    "runtime/model/components/{}/ports/{}/data",
                    component_id, port_id
                ),
            )
            .body(value, MIME_TEXT),
        )
        .await
    }

    pub async fn trigger_event(
        &self,
        component_id: &str,
        event_port_id: &str,
        method: WriteMethod,
    ) -> Result<RestResponse> {
        let component_id = segment(component_id, "component_id")?;
        let event_port_id = segment(event_port_id, "event_port_id")?;
        self.call(RestRequest::new(
            method,
            format!(
                "runtime/model/components/{}/events/{}",
                component_id, event_port_id
            ),
        ))
        .await
    }

    // Storage

    pub async fn download_model_from_file(&self, filepath: &str) -> Result<RestResponse> {
        let filepath = segment(filepath, "filepath")?;
        self.call(RestRequest::get(format!("storage/models/{}", filepath)).accept(MIME_XML))
            .await
    }

    pub async fn store_model(&self, filepath: &str, model_xml: &str) -> Result<RestResponse> {
        let filepath = segment(filepath, "filepath")?;
        let model_xml = require(model_xml, "model_xml")?;
        self.call(
            RestRequest::new(WriteMethod::Post, format!("storage/models/{}", filepath))
                .body(model_xml, MIME_TEXT),
        )
        .await
    }

    pub async fn store_data(&self, filepath: &str, data: &str) -> Result<RestResponse> {
        let filepath = segment(filepath, "filepath")?;
        let data = require(data, "data")?;
        self.call(
            RestRequest::new(WriteMethod::Post, format!("storage/data/{}", filepath))
                .body(data, MIME_TEXT),
        )
        .await
    }

    pub async fn store_webapp_data(
        &self,
        webapp_id: &str,
        filepath: &str,
        data: &str,
    ) -> Result<RestResponse> {
        let webapp_id = segment(webapp_id, "webapp_id")?;
        let filepath = segment(filepath, "filepath")?;
        let data = require(data, "data")?;
        self.call(
            RestRequest::new(
                WriteMethod::Post,
                format!("storage/webapps/{}/{}", webapp_id, filepath),
            )
            .body(data, MIME_XML),
        )
        .await
    }

    pub async fn get_webapp_data(&self, webapp_id: &str, filepath: &str) -> Result<RestResponse> {
        let webapp_id = segment(webapp_id, "webapp_id")?;
        let filepath = segment(filepath, "filepath")?;
        self.call(
            RestRequest::get(format!("storage/webapps/{}/{}", webapp_id, filepath))
                .accept(MIME_TEXT),
        )
        .await
    }

    pub async fn delete_model_from_file(&self, filepath: &str) -> Result<RestResponse> {
        let filepath = segment(filepath, "filepath")?;
        self.call(RestRequest::delete(format!("storage/models/{}", filepath)).accept(MIME_TEXT))
            .await
    }

    pub async fn list_stored_models(&self) -> Result<RestResponse> {
        self.call(RestRequest::get("storage/models/names").accept(MIME_JSON))
            .await
    }

    pub async fn get_component_descriptors_as_xml(&self) -> Result<RestResponse> {
        self.call(RestRequest::get("storage/components/descriptors/xml").accept(MIME_XML))
            .await
    }

    pub async fn get_component_descriptors_as_json(&self) -> Result<RestResponse> {
        self.call(RestRequest::get("storage/components/descriptors/json").accept(MIME_JSON))
            .await
    }

    // Functions

    /// Self-description of every REST function the server offers
    pub async fn get_rest_functions(&self) -> Result<RestResponse> {
        self.call(RestRequest::get("restfunctions").accept(MIME_JSON))
            .await
    }
}
