pub mod mock_are_server;
