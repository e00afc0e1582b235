pub mod mock_event_transport;
