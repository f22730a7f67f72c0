/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/
/// Credential modes and token state
pub mod auth;
/// HTTP transport, request bodies and single-shot dispatch
pub mod http;
/// Response models from API calls
pub mod responses;
