//! HTTP handlers for the Portability domain
