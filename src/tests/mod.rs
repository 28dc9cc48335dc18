mod lossify_properties;
