mod test_authenticate;
mod test_concurrent_auth;
mod test_logout;
mod test_profile;
mod test_refresh_rotation;
